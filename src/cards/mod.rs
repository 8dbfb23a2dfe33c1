//! Card system: records, definitions, decks and permanents.
//!
//! ## Key Types
//!
//! - `CardRecord` / `DeckList`: classified input data (serde)
//! - `Card`: parsed, immutable card template
//! - `CardCache`: caller-owned parse cache keyed by card name
//! - `Deck`: the shared card multiset a trial starts from
//! - `Permanent`: runtime state of one object on the battlefield
//! - `TokenTemplate`: what a token-making effect creates

pub mod deck;
pub mod definition;
pub mod instance;
pub mod record;
pub mod registry;

pub use deck::Deck;
pub use definition::{Card, CardId, CardType, Keywords, TriggeredAbility};
pub use instance::{Permanent, PermanentOrigin, TokenTemplate};
pub use record::{AbilityRecord, CardRecord, DeckEntry, DeckList};
pub use registry::CardCache;
