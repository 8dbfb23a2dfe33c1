//! Zones and the board economy.
//!
//! ## Key Types
//!
//! - `Battlefield`: permanents in play, filed by `Subdivision`
//! - `BoardEconomy`: library, hand, battlefield, graveyard, command zone,
//!   mana pool and counters of one trial
//! - `ZoneChange`: journal entry for a zone move
//! - `Census`: zone sizes for the conservation check

pub mod battlefield;
pub mod board;

pub use battlefield::{Battlefield, Subdivision};
pub use board::{BoardCounters, BoardEconomy, Census, ZoneChange, ZonePosition, COMMANDER_TAX};
