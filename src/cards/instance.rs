//! Permanents: runtime card state on the battlefield.
//!
//! A `Permanent` is a specific object in play. It points at a shared
//! `Card` template and tracks what changes during a trial: tapped status,
//! counters, temporary buffs and how long it has been under control.
//!
//! Tokens are permanents whose template comes from a [`TokenTemplate`]
//! rather than the deck.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{Card, CardId, CardType};
use crate::core::PermanentId;
use crate::mana::{ManaSource, SourceKind};

/// Where a permanent came from. Decides where it goes when it leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermanentOrigin {
    /// A deck card; goes to the graveyard.
    Deck(CardId),
    /// The commander; returns to the command zone.
    Commander,
    /// A token; ceases to exist.
    Token,
}

/// Data needed to create a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenTemplate {
    pub name: String,
    #[serde(default)]
    pub power: i32,
    #[serde(default)]
    pub toughness: i32,
    #[serde(default = "yes")]
    pub creature: bool,
    #[serde(default)]
    pub artifact: bool,
    #[serde(default)]
    pub haste: bool,
    /// Sacrificed in the end step of the turn it was created.
    #[serde(default)]
    pub sacrifice_at_end: bool,
}

fn yes() -> bool {
    true
}

impl TokenTemplate {
    /// A creature token.
    #[must_use]
    pub fn creature(name: impl Into<String>, power: i32, toughness: i32) -> Self {
        Self {
            name: name.into(),
            power,
            toughness,
            creature: true,
            artifact: false,
            haste: false,
            sacrifice_at_end: false,
        }
    }

    #[must_use]
    pub fn with_haste(mut self) -> Self {
        self.haste = true;
        self
    }

    #[must_use]
    pub fn sacrificed_at_end(mut self) -> Self {
        self.sacrifice_at_end = true;
        self
    }

    /// The card template a token of this kind points at.
    #[must_use]
    pub fn to_card(&self) -> Card {
        let mut types: SmallVec<[CardType; 2]> = SmallVec::new();
        if self.creature {
            types.push(CardType::Creature);
        }
        if self.artifact || types.is_empty() {
            types.push(CardType::Artifact);
        }
        let mut card = Card::new(self.name.clone(), &types);
        card.power = self.power;
        card.toughness = self.toughness;
        card.keywords.haste = self.haste;
        card
    }
}

/// A permanent on the battlefield.
#[derive(Clone, Debug)]
pub struct Permanent {
    pub id: PermanentId,
    pub origin: PermanentOrigin,
    pub card: Arc<Card>,
    pub tapped: bool,
    /// Combat steps survived. Zero means it arrived this turn.
    pub turns_under_control: u32,
    /// +1/+1 counters.
    pub plus_counters: i32,
    pub loyalty: i32,
    /// Power buff that wears off at end of turn.
    pub temp_power: i32,
    /// For equipment: the creature it is attached to.
    pub attached_to: Option<PermanentId>,
    pub sacrifice_at_end: bool,
}

impl Permanent {
    /// Create an untapped permanent that has just arrived.
    #[must_use]
    pub fn new(id: PermanentId, origin: PermanentOrigin, card: Arc<Card>) -> Self {
        let loyalty = i32::from(card.loyalty);
        Self {
            id,
            origin,
            tapped: card.enters_tapped,
            card,
            turns_under_control: 0,
            plus_counters: 0,
            loyalty,
            temp_power: 0,
            attached_to: None,
            sacrifice_at_end: false,
        }
    }

    #[must_use]
    pub fn is_token(&self) -> bool {
        self.origin == PermanentOrigin::Token
    }

    /// Deck slot this permanent came from, if any.
    #[must_use]
    pub fn card_id(&self) -> Option<CardId> {
        match self.origin {
            PermanentOrigin::Deck(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card.is_creature()
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.card.is_land()
    }

    #[must_use]
    pub fn has_haste(&self) -> bool {
        self.card.keywords.haste
    }

    /// Arrived this turn without haste.
    #[must_use]
    pub fn is_summoning_sick(&self) -> bool {
        !self.has_haste() && self.turns_under_control < 1
    }

    /// Power before equipment bonuses.
    #[must_use]
    pub fn power(&self) -> i32 {
        self.card.power + self.plus_counters + self.temp_power
    }

    /// Mana sources this permanent contributes to the pool on `turn`.
    ///
    /// Tapped permanents contribute nothing. Summoning-sick creatures
    /// contribute sources that only become available next turn.
    #[must_use]
    pub fn mana_sources(&self, turn: u32) -> SmallVec<[ManaSource; 2]> {
        let Some(colors) = self.card.produces else {
            return SmallVec::new();
        };
        if self.tapped {
            return SmallVec::new();
        }
        let (kind, available_from) = if self.is_land() {
            (SourceKind::Land, turn)
        } else if self.is_creature() {
            let from = if self.is_summoning_sick() { turn + 1 } else { turn };
            (SourceKind::Dork, from)
        } else {
            (SourceKind::Rock, turn)
        };
        let source = ManaSource::new(colors, kind)
            .available_from(available_from)
            .with_origin(self.id);
        std::iter::repeat(source)
            .take(usize::from(self.card.produced_amount))
            .collect()
    }
}
