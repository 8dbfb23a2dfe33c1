//! Resource model and allocation solver.
//!
//! ## Key Types
//!
//! - [`ManaColor`] / [`ColorSet`]: what a source can produce
//! - [`ManaCost`]: a parsed cost vector (colored pips, colorless, generic, X)
//! - [`ManaSource`]: one unit of mana with an availability turn and origin
//! - [`ManaPool`]: the per-turn multiset of sources
//!
//! The solver functions ([`can_pay`], [`spend`], [`plan_payment`]) are pure
//! and never consume sources on failure.

mod color;
mod cost;
mod pool;
mod solver;
mod source;

pub use color::{ColorSet, ManaColor};
pub use cost::ManaCost;
pub use pool::ManaPool;
pub use solver::{can_pay, plan_payment, spend, Assignment};
pub use source::{ManaSource, SourceKind};
