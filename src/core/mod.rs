//! Core engine types: permanent IDs, RNG, configuration, errors.
//!
//! This module contains the building blocks shared by every other module.
//! Nothing here knows about mana or cards.

pub mod config;
pub mod entity;
pub mod error;
pub mod rng;

pub use config::{EngineMode, HoldBackRule, MulliganRule, SeedPolicy, SimConfig, ValidityThresholds};
pub use entity::{EntityAllocator, PermanentId};
pub use error::{SimError, SimResult};
pub use rng::{TrialRng, SEED_SPREAD};
