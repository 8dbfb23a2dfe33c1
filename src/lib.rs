//! # rust-goldfish
//!
//! A goldfish simulator for trading card game decks: play a deck against
//! an opponent who does nothing, many thousands of times, and measure how
//! fast it develops.
//!
//! ## Design Principles
//!
//! 1. **One engine**: the full board simulation and the fast mana-only
//!    path are the same turn engine with a restricted configuration.
//!
//! 2. **Effects are data**: abilities are a tagged [`Effect`] enum read by
//!    one resolver, so card behavior can be inspected and tested without
//!    running a game.
//!
//! 3. **Trials share nothing**: each trial owns its board, registry and
//!    RNG. The deck is shared read-only; caches are owned by callers.
//!
//! ## Architecture
//!
//! - **Allocation solver**: greedy scarcest-color-first assignment of mana
//!   sources to cost pips. `X` is paid as zero.
//!
//! - **Persistent library**: `im::Vector` keeps the library cheap to
//!   snapshot and to splice.
//!
//! - **Deterministic seeds**: deck hash plus trial index, so identical
//!   decks reproduce identical reports on any number of workers.
//!
//! ## Modules
//!
//! - `core`: IDs, RNG, configuration, errors
//! - `mana`: colors, costs, sources, the allocation solver and the pool
//! - `cards`: card records, parsed cards, decks and permanents
//! - `zones`: the board economy of one trial
//! - `effects`: the effect enum and its resolver
//! - `triggers`: events, conditions and the trigger registry
//! - `rules`: phases, land choice, the action policy and the turn engine
//! - `sim`: the Monte Carlo driver, statistics and reports
//!
//! ## Example
//!
//! ```
//! use rust_goldfish::cards::{CardRecord, DeckList};
//! use rust_goldfish::core::SimConfig;
//! use rust_goldfish::sim::{simulate, Metric};
//!
//! let list = DeckList::new()
//!     .with_card(CardRecord::new("Plains", &["land"]).with_produces(&["W"]), 24)
//!     .with_card(
//!         CardRecord::new("Savannah Lions", &["creature"]).with_cost("{W}").with_stats(2, 1),
//!         36,
//!     );
//! let config = SimConfig::default().with_trials(200).with_max_turns(5);
//!
//! let report = simulate(&list, &config).unwrap();
//! assert_eq!(report.trials_completed, 200);
//! assert!(report.mean_at(Metric::LandsInPlay, 5).unwrap() > 3.0);
//! ```

pub mod cards;
pub mod core;
pub mod effects;
pub mod mana;
pub mod rules;
pub mod sim;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{EngineMode, PermanentId, SeedPolicy, SimConfig, SimError, SimResult, TrialRng};

pub use crate::mana::{can_pay, spend, ColorSet, ManaColor, ManaCost, ManaPool, ManaSource, SourceKind};

pub use crate::cards::{Card, CardCache, CardId, CardRecord, Deck, DeckList, Permanent, TokenTemplate};

pub use crate::zones::{BoardEconomy, ZoneChange};

pub use crate::effects::{Effect, EffectResolver, EffectTarget};

pub use crate::triggers::{EventKind, Trigger, TriggerCondition, TriggerEvent, TriggerRegistry};

pub use crate::rules::{Action, ActionPolicy, GreedyPolicy, Phase, TurnEngine};

pub use crate::sim::{AggregateReport, CancelToken, Metric, MonteCarloDriver, SummaryStats, TrialMetrics, Verdict};
