//! Simulation configuration.
//!
//! Callers configure a run with a `SimConfig` built from `Default` plus
//! `with_*` builder methods, or loaded from JSON:
//!
//! ```
//! use rust_goldfish::core::{EngineMode, SeedPolicy, SimConfig};
//!
//! let config = SimConfig::default()
//!     .with_trials(500)
//!     .with_max_turns(8)
//!     .with_seed_policy(SeedPolicy::Deterministic)
//!     .with_mode(EngineMode::ManaOnly);
//!
//! assert!(config.validate().is_ok());
//!
//! let loaded = SimConfig::from_json(r#"{"trial_count": 250, "on_the_play": false}"#).unwrap();
//! assert_eq!(loaded.trial_count, 250);
//! assert!(!loaded.on_the_play);
//! assert_eq!(loaded.max_turns, SimConfig::default().max_turns);
//! ```

use serde::{Deserialize, Serialize};

use super::error::{SimError, SimResult};

/// How trial seeds are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Hash of the sorted deck card names, offset by trial index.
    /// Identical decks reproduce identical reports.
    #[default]
    Deterministic,
    /// Wall-clock derived base seed; every invocation differs.
    TimeBased,
    /// Explicit base seed, offset by trial index.
    Fixed(u64),
}

/// How much board detail the engine simulates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    /// Combat, triggers and every policy rule.
    #[default]
    Full,
    /// Land drops, mana permanents, ramp spells and the marquee spell only.
    /// No triggers, no combat.
    ManaOnly,
}

impl EngineMode {
    /// Whether triggers and combat are simulated.
    #[must_use]
    pub fn simulates_board(self) -> bool {
        matches!(self, EngineMode::Full)
    }

    /// The mode's name in trace output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EngineMode::Full => "full",
            EngineMode::ManaOnly => "mana-only",
        }
    }
}

/// London-style mulligan: redraw seven, bottom one card per mulligan taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulliganRule {
    /// Mulligans are taken at all.
    pub enabled: bool,
    /// Keep hands with at least this many lands.
    pub min_lands: usize,
    /// Keep hands with at most this many lands.
    pub max_lands: usize,
    /// Stop mulliganing after this many redraws.
    pub max_mulligans: usize,
}

impl Default for MulliganRule {
    fn default() -> Self {
        Self {
            enabled: true,
            min_lands: 2,
            max_lands: 5,
            max_mulligans: 2,
        }
    }
}

impl MulliganRule {
    /// Never mulligan.
    #[must_use]
    pub fn never() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Does a hand with `lands` lands get kept?
    #[must_use]
    pub fn keeps(&self, lands: usize) -> bool {
        !self.enabled || (self.min_lands..=self.max_lands).contains(&lands)
    }
}

/// Veto on casting plain creatures when the board does not call for them.
///
/// Only creatures without haste or enters-the-battlefield value are held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldBackRule {
    /// Hold a creature that would leave fewer than this many creatures in
    /// play while the hand has another spell to spend the mana on.
    pub min_attackers: usize,
    /// Hold every such creature once this many creatures are in play.
    pub max_board_creatures: usize,
}

impl HoldBackRule {
    /// Never hold anything back.
    #[must_use]
    pub fn never() -> Self {
        Self {
            min_attackers: 0,
            max_board_creatures: usize::MAX,
        }
    }
}

impl Default for HoldBackRule {
    fn default() -> Self {
        Self {
            min_attackers: 2,
            max_board_creatures: 8,
        }
    }
}

/// Thresholds for the statistical-validity verdict.
///
/// The verdict is driven by the relative standard error of the mean damage,
/// `cv / sqrt(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidityThresholds {
    /// At or below this relative standard error the run is reliable.
    pub reliable_below: f64,
    /// Above this relative standard error more trials are recommended.
    pub increase_above: f64,
    /// Desired confidence half-width as a fraction of the mean.
    pub target_relative_half_width: f64,
    /// Normal quantile for the confidence interval (1.96 = 95%).
    pub z: f64,
}

impl Default for ValidityThresholds {
    fn default() -> Self {
        Self {
            reliable_below: 0.01,
            increase_above: 0.02,
            target_relative_half_width: 0.01,
            z: 1.96,
        }
    }
}

/// Complete configuration for a Monte Carlo run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of independent trials.
    pub trial_count: usize,

    /// Turns simulated per trial.
    pub max_turns: u32,

    /// Seed derivation.
    pub seed_policy: SeedPolicy,

    /// Worker threads in the trial pool.
    pub worker_count: usize,

    /// Contiguous batches handed to each worker. More batches make
    /// cancellation finer-grained.
    pub batches_per_worker: usize,

    /// Skip the draw on turn 1.
    pub on_the_play: bool,

    /// Cards in the opening hand.
    pub opening_hand_size: usize,

    /// Discard down to this many cards at end of turn.
    pub max_hand_size: usize,

    /// Our starting life.
    pub starting_life: i64,

    /// Goldfish life: the turn cumulative damage reaches this is the win turn.
    pub opponent_life: i64,

    /// Full board simulation or the mana-only fast path.
    pub mode: EngineMode,

    /// Opening hand mulligan rule.
    pub mulligan: MulliganRule,

    /// Creature hold-back veto.
    pub hold_back: HoldBackRule,

    /// Upper bound on actions taken in one main phase.
    pub max_policy_steps: usize,

    /// Upper bound on chained trigger firings from one event.
    pub max_trigger_depth: usize,

    /// Validity verdict thresholds.
    pub validity: ValidityThresholds,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trial_count: 10_000,
            max_turns: 10,
            seed_policy: SeedPolicy::Deterministic,
            worker_count: 4,
            batches_per_worker: 4,
            on_the_play: true,
            opening_hand_size: 7,
            max_hand_size: 7,
            starting_life: 40,
            opponent_life: 40,
            mode: EngineMode::Full,
            mulligan: MulliganRule::default(),
            hold_back: HoldBackRule::default(),
            max_policy_steps: 64,
            max_trigger_depth: 8,
            validity: ValidityThresholds::default(),
        }
    }
}

impl SimConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the number of trials.
    #[must_use]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trial_count = trials;
        self
    }

    /// Set turns per trial.
    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }

    /// Set the seed policy.
    #[must_use]
    pub fn with_seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    /// Set the worker pool size.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Set whether we are on the play.
    #[must_use]
    pub fn with_on_the_play(mut self, on_the_play: bool) -> Self {
        self.on_the_play = on_the_play;
        self
    }

    /// Set the engine mode.
    #[must_use]
    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mulligan rule.
    #[must_use]
    pub fn with_mulligan(mut self, rule: MulliganRule) -> Self {
        self.mulligan = rule;
        self
    }

    /// Set the hold-back veto.
    #[must_use]
    pub fn with_hold_back(mut self, rule: HoldBackRule) -> Self {
        self.hold_back = rule;
        self
    }

    /// Set both life totals.
    #[must_use]
    pub fn with_life(mut self, ours: i64, opponent: i64) -> Self {
        self.starting_life = ours;
        self.opponent_life = opponent;
        self
    }

    /// Set validity thresholds.
    #[must_use]
    pub fn with_validity(mut self, thresholds: ValidityThresholds) -> Self {
        self.validity = thresholds;
        self
    }

    /// Check the configuration for values the driver cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.trial_count == 0 {
            return Err(SimError::InvalidConfig("trial_count must be positive".into()));
        }
        if self.max_turns == 0 {
            return Err(SimError::InvalidConfig("max_turns must be positive".into()));
        }
        if self.worker_count == 0 || self.batches_per_worker == 0 {
            return Err(SimError::InvalidConfig(
                "worker_count and batches_per_worker must be positive".into(),
            ));
        }
        if self.mulligan.min_lands > self.mulligan.max_lands {
            return Err(SimError::InvalidConfig(
                "mulligan min_lands exceeds max_lands".into(),
            ));
        }
        let v = &self.validity;
        if !(v.reliable_below > 0.0 && v.reliable_below <= v.increase_above) {
            return Err(SimError::InvalidConfig(
                "validity thresholds must satisfy 0 < reliable_below <= increase_above".into(),
            ));
        }
        if v.target_relative_half_width <= 0.0 || v.z <= 0.0 {
            return Err(SimError::InvalidConfig(
                "validity target width and z must be positive".into(),
            ));
        }
        Ok(())
    }
}
