//! Trigger dispatcher for triggered abilities.
//!
//! ## Key Components
//!
//! - [`EventKind`]: the closed set of events abilities listen for
//! - [`TriggerEvent`]: an event with the permanent it is about
//! - [`TriggerCondition`]: filters on the event and the board
//! - [`TriggerRegistry`]: per-trial storage, lookup and firing
//!
//! Firing evaluates every matching condition first, then resolves the
//! passing effects by priority tier (token/counter generation, damage,
//! resources, doubling), registration order within a tier.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_goldfish::cards::{Card, Deck, TokenTemplate};
//! use rust_goldfish::effects::Effect;
//! use rust_goldfish::mana::ManaColor;
//! use rust_goldfish::triggers::{EventKind, Trigger, TriggerEvent, TriggerRegistry};
//! use rust_goldfish::zones::BoardEconomy;
//!
//! let deck = Arc::new(Deck::from_cards([(Card::land("Plains", ManaColor::White), 10)]));
//! let mut board = BoardEconomy::new(deck, 20, 20);
//!
//! let mut registry = TriggerRegistry::new();
//! let soldiers = Effect::tokens(TokenTemplate::creature("Soldier", 1, 1), 2);
//! registry.register(Trigger::new("Muster", EventKind::Upkeep, soldiers));
//!
//! let outcome = registry.fire(&TriggerEvent::new(EventKind::Upkeep), &mut board).unwrap();
//! assert_eq!(outcome.token_count(), 2);
//! ```

mod condition;
mod event;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
pub use event::{EventKind, TriggerEvent};
pub use registry::{Trigger, TriggerId, TriggerRegistry, TriggeredEffect};
