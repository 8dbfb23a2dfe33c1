//! Turn structure and play decisions.
//!
//! [`TurnEngine`] walks the fixed [`Phase`] cycle for one trial. Inside the
//! main phase it plays a land picked by [`choose_land`], then asks an
//! [`ActionPolicy`] for actions until it has none left.

pub mod engine;
pub mod lands;
pub mod phase;
pub mod policy;

pub use engine::{run_trial, TurnEngine};
pub use lands::choose_land;
pub use phase::Phase;
pub use policy::{Action, ActionPolicy, GreedyPolicy};
