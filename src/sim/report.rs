//! Aggregated results of a Monte Carlo run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metrics::{Metric, TrialMetrics};
use super::stats::{SummaryStats, Verdict};
use crate::core::{EngineMode, SimConfig, SimResult};

/// Everything a run measured, reduced over its completed trials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Seed trial 0 ran with.
    pub base_seed: u64,
    pub max_turns: u32,
    pub mode: EngineMode,
    pub trials_requested: usize,
    pub trials_completed: usize,
    /// Trials abandoned on a malformed card record.
    pub trials_excluded: usize,
    /// Set when the run was cancelled before every batch was scheduled.
    pub cancelled: bool,

    /// Per-turn summaries, index = turn - 1.
    pub series: BTreeMap<Metric, Vec<SummaryStats>>,

    pub damage: SummaryStats,
    /// Over trials that won.
    pub win_turn: SummaryStats,
    /// Over trials that cast the marquee.
    pub marquee_turn: SummaryStats,
    pub win_rate: f64,
    pub marquee_rate: f64,
    pub land_drops: SummaryStats,
    pub ramp_lands: SummaryStats,
    pub tokens_created: SummaryStats,
    pub tokens_destroyed: SummaryStats,
    pub mulligans: SummaryStats,

    pub relative_standard_error: f64,
    pub verdict: Verdict,
}

impl AggregateReport {
    /// Reduce completed trials, in trial-index order.
    #[must_use]
    pub fn from_trials(
        trials: &[TrialMetrics],
        excluded: usize,
        config: &SimConfig,
        base_seed: u64,
    ) -> Self {
        let rate = |hits: usize| {
            if trials.is_empty() {
                0.0
            } else {
                hits as f64 / trials.len() as f64
            }
        };

        let series = Metric::ALL
            .into_iter()
            .map(|metric| {
                let per_turn = (1..=config.max_turns)
                    .map(|turn| {
                        let values: Vec<f64> = trials.iter().filter_map(|t| t.at(metric, turn)).collect();
                        SummaryStats::from_values(&values)
                    })
                    .collect();
                (metric, per_turn)
            })
            .collect();

        let damage = summarize(trials, |t| Some(t.total_damage as f64));
        let win_turn = summarize(trials, |t| t.win_turn.map(f64::from));
        let marquee_turn = summarize(trials, |t| t.marquee_turn.map(f64::from));

        Self {
            base_seed,
            max_turns: config.max_turns,
            mode: config.mode,
            trials_requested: config.trial_count,
            trials_completed: trials.len(),
            trials_excluded: excluded,
            cancelled: false,
            series,
            win_rate: rate(win_turn.count),
            marquee_rate: rate(marquee_turn.count),
            land_drops: summarize(trials, |t| Some(f64::from(t.land_drops))),
            ramp_lands: summarize(trials, |t| Some(f64::from(t.ramp_lands))),
            tokens_created: summarize(trials, |t| Some(f64::from(t.tokens_created))),
            tokens_destroyed: summarize(trials, |t| Some(f64::from(t.tokens_destroyed))),
            mulligans: summarize(trials, |t| Some(f64::from(t.mulligans))),
            relative_standard_error: damage.relative_standard_error(),
            verdict: Verdict::judge(&damage, &config.validity),
            damage,
            win_turn,
            marquee_turn,
        }
    }

    /// Per-turn summaries for `metric`.
    #[must_use]
    pub fn series(&self, metric: Metric) -> &[SummaryStats] {
        self.series.get(&metric).map_or(&[], Vec::as_slice)
    }

    /// Summary of `metric` at the end of `turn` (1-based).
    #[must_use]
    pub fn at(&self, metric: Metric, turn: u32) -> Option<&SummaryStats> {
        let index = usize::try_from(turn).ok()?.checked_sub(1)?;
        self.series(metric).get(index)
    }

    /// Mean of `metric` at the end of `turn`.
    #[must_use]
    pub fn mean_at(&self, metric: Metric, turn: u32) -> Option<f64> {
        self.at(metric, turn).map(|s| s.mean)
    }

    #[must_use]
    pub fn recommended_trials(&self) -> Option<usize> {
        self.verdict.recommended()
    }

    /// Canonical byte form; equal reports give equal bytes.
    pub fn to_bytes(&self) -> SimResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Summarize one value per trial, skipping trials without one.
fn summarize(trials: &[TrialMetrics], value: impl Fn(&TrialMetrics) -> Option<f64>) -> SummaryStats {
    let values: Vec<f64> = trials.iter().filter_map(value).collect();
    SummaryStats::from_values(&values)
}
