//! Monte Carlo driver: many independent trials, reduced to one report.
//!
//! Trials are split into contiguous batches run on a local rayon pool. Each
//! trial gets a fresh board and registry and a seed derived from its index,
//! so deterministic runs reproduce bit for bit whatever order batches
//! finish in.

use std::io::Write;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rayon::prelude::*;

use super::metrics::TrialMetrics;
use super::report::AggregateReport;
use crate::cards::{Deck, DeckList};
use crate::core::{SeedPolicy, SimConfig, SimError, SimResult, SEED_SPREAD};
use crate::rules::{run_trial, TurnEngine};

/// Shared flag that stops batches from being scheduled.
///
/// Batches already running finish; a trial is never interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Output of one batch.
#[derive(Debug, Default)]
struct BatchResult {
    trials: Vec<TrialMetrics>,
    excluded: usize,
}

/// Runs trials of one deck.
#[derive(Debug)]
pub struct MonteCarloDriver {
    deck: Arc<Deck>,
    config: SimConfig,
    cancel: CancelToken,
}

impl MonteCarloDriver {
    #[must_use]
    pub fn new(deck: Arc<Deck>, config: SimConfig) -> Self {
        Self {
            deck,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Build the deck from a list. Malformed card records do not fail
    /// here; only trials that draw them are excluded.
    pub fn from_list(list: &DeckList, config: SimConfig) -> SimResult<Self> {
        Ok(Self::new(Arc::new(Deck::load(list)?), config))
    }

    /// Use a caller-held cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn deck(&self) -> &Arc<Deck> {
        &self.deck
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Seed of trial 0 under `policy`.
    #[must_use]
    pub fn base_seed(&self, policy: SeedPolicy) -> u64 {
        match policy {
            SeedPolicy::Deterministic => self.deck.seed_hash(),
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::TimeBased => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
        }
    }

    /// Seed of trial `index`.
    #[must_use]
    pub fn trial_seed(base: u64, index: usize) -> u64 {
        base.wrapping_add((index as u64).wrapping_mul(SEED_SPREAD))
    }

    /// Run with the driver's configuration, overriding the four run
    /// parameters.
    pub fn run(
        &self,
        trial_count: usize,
        max_turns: u32,
        seed_policy: SeedPolicy,
        worker_count: usize,
    ) -> SimResult<AggregateReport> {
        let config = self
            .config
            .clone()
            .with_trials(trial_count)
            .with_max_turns(max_turns)
            .with_seed_policy(seed_policy)
            .with_workers(worker_count);
        self.run_configured(&config)
    }

    /// Run every trial `config` asks for.
    ///
    /// Fails with `Cancelled` if cancellation left no completed trial, and
    /// with `WorkerFailure` if a batch panics twice.
    pub fn run_configured(&self, config: &SimConfig) -> SimResult<AggregateReport> {
        config.validate()?;
        let base = self.base_seed(config.seed_policy);
        let batches = partition(
            config.trial_count,
            config.worker_count.saturating_mul(config.batches_per_worker),
        );
        debug!(
            "running {} trials in {} batches on {} workers, base seed {base:#x}",
            config.trial_count,
            batches.len(),
            config.worker_count
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count.min(config.trial_count))
            .build()
            .map_err(|e| SimError::InvalidConfig(format!("worker pool: {e}")))?;

        let results: Vec<Option<SimResult<BatchResult>>> = pool.install(|| {
            batches
                .par_iter()
                .enumerate()
                .map(|(batch, range)| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    Some(guarded(batch, || self.run_batch(range.clone(), base, config)))
                })
                .collect()
        });

        let mut trials = Vec::with_capacity(config.trial_count);
        let mut excluded = 0;
        let mut cancelled = false;
        for result in results {
            match result {
                Some(batch) => {
                    let batch = batch?;
                    trials.extend(batch.trials);
                    excluded += batch.excluded;
                }
                None => cancelled = true,
            }
        }
        if cancelled && trials.is_empty() {
            return Err(SimError::Cancelled);
        }

        let mut report = AggregateReport::from_trials(&trials, excluded, config, base);
        report.cancelled = cancelled;
        info!(
            "{} trials completed, {} excluded, verdict {:?}",
            report.trials_completed, report.trials_excluded, report.verdict
        );
        Ok(report)
    }

    fn run_batch(&self, range: Range<usize>, base: u64, config: &SimConfig) -> SimResult<BatchResult> {
        let mut result = BatchResult::default();
        for index in range {
            match run_trial(Arc::clone(&self.deck), config, Self::trial_seed(base, index)) {
                Ok(metrics) => result.trials.push(metrics),
                Err(err) if err.is_trial_fatal() => {
                    debug!("trial {index} excluded: {err}");
                    result.excluded += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(result)
    }

    /// Replay trial `index` of a run with the driver's configuration,
    /// writing its turn log to `sink`.
    ///
    /// Under `SeedPolicy::TimeBased` the replay gets a new base seed.
    pub fn trace_trial(&self, index: usize, sink: &mut dyn Write) -> SimResult<TrialMetrics> {
        let seed = Self::trial_seed(self.base_seed(self.config.seed_policy), index);
        TurnEngine::new(Arc::clone(&self.deck), &self.config, seed)
            .with_trace(sink)
            .run()
    }
}

/// Load `list` and run it with `config`.
pub fn simulate(list: &DeckList, config: &SimConfig) -> SimResult<AggregateReport> {
    MonteCarloDriver::from_list(list, config.clone())?.run_configured(config)
}

/// Split `0..total` into at most `parts` contiguous ranges whose sizes
/// differ by at most one.
fn partition(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, total.max(1));
    let (size, extra) = (total / parts, total % parts);
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let len = size + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .filter(|r| !r.is_empty())
        .collect()
}

/// Run `work`, retrying once if it panics.
fn guarded<T>(batch: usize, work: impl Fn() -> SimResult<T>) -> SimResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(&work)) {
        Ok(result) => result,
        Err(payload) => {
            debug!("batch {batch} panicked ({}), retrying", panic_message(payload.as_ref()));
            panic::catch_unwind(AssertUnwindSafe(&work)).unwrap_or_else(|payload| {
                Err(SimError::WorkerFailure {
                    batch,
                    reason: panic_message(payload.as_ref()),
                })
            })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::cards::Card;
    use crate::core::MulliganRule;
    use crate::mana::{ManaColor, ManaCost};
    use crate::sim::Metric;

    fn deck() -> Arc<Deck> {
        Arc::new(Deck::from_cards([
            (Card::land("Plains", ManaColor::White), 16),
            (Card::creature("Lions", ManaCost::parse("{W}").unwrap(), 2, 1), 14),
        ]))
    }

    fn config() -> SimConfig {
        SimConfig::default()
            .with_trials(40)
            .with_max_turns(4)
            .with_workers(2)
            .with_mulligan(MulliganRule::never())
    }

    #[test]
    fn test_partition() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(2, 8), vec![0..1, 1..2]);
        assert_eq!(partition(0, 4), Vec::<Range<usize>>::new());
    }

    #[test]
    fn test_trial_seeds_spread() {
        assert_eq!(MonteCarloDriver::trial_seed(5, 0), 5);
        assert_ne!(MonteCarloDriver::trial_seed(5, 1), MonteCarloDriver::trial_seed(5, 2));
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let driver = MonteCarloDriver::new(deck(), config());
        let one = driver.run(40, 4, SeedPolicy::Deterministic, 1).unwrap();
        let three = driver.run(40, 4, SeedPolicy::Deterministic, 3).unwrap();
        assert_eq!(one.to_bytes().unwrap(), three.to_bytes().unwrap());
        assert_eq!(one.trials_completed, 40);
        assert_eq!(one.base_seed, deck().seed_hash());
    }

    #[test]
    fn test_oversized_worker_counts_are_capped() {
        let mut huge = config();
        huge.worker_count = usize::MAX;
        huge.batches_per_worker = usize::MAX;
        let driver = MonteCarloDriver::new(deck(), config());
        let capped = driver.run_configured(&huge).unwrap();
        let one = driver.run(40, 4, SeedPolicy::Deterministic, 1).unwrap();
        assert_eq!(capped.trials_completed, 40);
        assert_eq!(capped.to_bytes().unwrap(), one.to_bytes().unwrap());
    }

    #[test]
    fn test_fixed_seed_changes_results() {
        let driver = MonteCarloDriver::new(deck(), config());
        let a = driver.run(40, 4, SeedPolicy::Fixed(1), 2).unwrap();
        let b = driver.run(40, 4, SeedPolicy::Fixed(2), 2).unwrap();
        assert_eq!(a.base_seed, 1);
        assert_ne!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        let driver = MonteCarloDriver::new(deck(), config()).with_cancel_token(token.clone());
        token.cancel();
        assert_eq!(driver.run_configured(&config()), Err(SimError::Cancelled));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let driver = MonteCarloDriver::new(deck(), config());
        assert!(matches!(
            driver.run(0, 4, SeedPolicy::Deterministic, 2),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_trace_replays_trial() {
        let driver = MonteCarloDriver::new(deck(), config());
        let mut log: Vec<u8> = Vec::new();
        let traced = driver.trace_trial(3, &mut log).unwrap();
        let seed = MonteCarloDriver::trial_seed(deck().seed_hash(), 3);
        let replayed = run_trial(deck(), &config(), seed).unwrap();
        assert_eq!(traced, replayed);
        assert!(String::from_utf8(log).unwrap().contains("turn 4"));
        assert_eq!(traced.series(Metric::LandsInPlay).len(), 4);
    }

    #[test]
    fn test_guarded_retries_once() {
        let calls = AtomicUsize::new(0);
        let flaky = guarded(0, || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first attempt");
            }
            Ok(7)
        });
        assert_eq!(flaky, Ok(7));

        let broken: SimResult<()> = guarded(4, || panic!("always"));
        assert_eq!(
            broken,
            Err(SimError::WorkerFailure {
                batch: 4,
                reason: "always".into()
            })
        );
    }
}
