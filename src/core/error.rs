//! Error taxonomy for the simulator.
//!
//! Recoverable conditions are handled close to where they arise:
//! - `UnpayableCost`: the action policy treats the action as illegal
//! - `EmptyLibrary`: the draw step is a no-op
//! - `InvalidCostString` / `MalformedCardRecord`: the trial that touched the
//!   card is aborted and excluded from the aggregate
//! - `WorkerFailure`: the driver retries the batch once, then surfaces it
//!
//! Broken zone invariants are programming errors and panic instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Errors produced by the simulator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("no assignment of mana sources pays {cost}")]
    UnpayableCost { cost: String },

    #[error("library is empty")]
    EmptyLibrary,

    #[error("invalid cost string {cost:?} on {card}")]
    InvalidCostString { card: String, cost: String },

    #[error("malformed card record {card}: {reason}")]
    MalformedCardRecord { card: String, reason: String },

    #[error("land drop already used this turn")]
    LandDropUsed,

    #[error("worker failed on batch {batch}: {reason}")]
    WorkerFailure { batch: usize, reason: String },

    #[error("run cancelled before any trial completed")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialize error: {0}")]
    Serialize(String),
}

impl SimError {
    /// Errors that abort a single trial and exclude it from the aggregate.
    #[must_use]
    pub fn is_trial_fatal(&self) -> bool {
        matches!(
            self,
            SimError::InvalidCostString { .. } | SimError::MalformedCardRecord { .. }
        )
    }
}

impl From<serde_json::Error> for SimError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}

impl From<bincode::Error> for SimError {
    fn from(value: bincode::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_fatal_classification() {
        assert!(SimError::InvalidCostString {
            card: "Bad".into(),
            cost: "{Q}".into()
        }
        .is_trial_fatal());
        assert!(SimError::MalformedCardRecord {
            card: "Bad".into(),
            reason: "no types".into()
        }
        .is_trial_fatal());
        assert!(!SimError::EmptyLibrary.is_trial_fatal());
        assert!(!SimError::UnpayableCost { cost: "{W}".into() }.is_trial_fatal());
    }

    #[test]
    fn test_display() {
        let err = SimError::InvalidCostString {
            card: "Widget".into(),
            cost: "{Q}".into(),
        };
        assert_eq!(err.to_string(), "invalid cost string \"{Q}\" on Widget");
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(SimError::from(err), SimError::Serialize(_)));
    }
}
