//! Effect system.
//!
//! - `Effect`: tagged-variant effect data carried by card records
//! - `EffectTarget`: fixed targeting rules
//! - `EffectResolver`: the single interpreter that applies effects to a
//!   `BoardEconomy`
//!
//! Effects resolved as one group share a `FireOutcome`, which is how
//! doubling effects see the tokens, counters and damage produced before
//! them.

mod effect;
mod resolver;
mod targeting;

pub use effect::{CounterKind, DoubleKind, Effect, EffectCategory};
pub use resolver::{EffectContext, EffectResolver, FireOutcome};
pub use targeting::EffectTarget;
