//! Classified card records and deck lists.
//!
//! These are the shapes handed over by the classification layer. They are
//! plain serde data; nothing is validated until a record is turned into a
//! [`Card`](super::Card).
//!
//! ```
//! use rust_goldfish::cards::DeckList;
//!
//! let list = DeckList::from_json(r#"{
//!     "cards": [
//!         {"count": 3, "name": "Plains", "types": ["land"], "produces": ["W"]},
//!         {"name": "Savannah Lions", "cost": "{W}", "types": ["creature"], "power": 2, "toughness": 1}
//!     ],
//!     "marquee": "Savannah Lions"
//! }"#).unwrap();
//!
//! assert_eq!(list.total_cards(), 4);
//! assert_eq!(list.marquee.as_deref(), Some("Savannah Lions"));
//! ```

use serde::{Deserialize, Serialize};

use crate::core::SimResult;
use crate::effects::Effect;
use crate::triggers::TriggerCondition;

/// One classified card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    pub name: String,
    /// Printed cost string, braced or bare. `None` means free.
    pub cost: Option<String>,
    /// Type tags such as `land`, `creature`, `legendary`.
    pub types: Vec<String>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    /// Mana tokens produced (`W`, `C`, `Any`, ...).
    pub produces: Vec<String>,
    pub produced_amount: Option<u8>,
    pub enters_tapped: bool,
    pub does_not_untap: bool,
    pub haste: bool,
    pub trample: bool,
    pub lifelink: bool,
    pub sacrifice_outlet: bool,
    /// Lands put onto the battlefield when the spell resolves.
    pub puts_land: u8,
    pub fetched_land_tapped: bool,
    pub equipment: bool,
    pub equip_cost: Option<String>,
    pub equip_power: i32,
    pub loyalty: Option<u8>,
    pub spell_effects: Vec<Effect>,
    pub abilities: Vec<AbilityRecord>,
}

impl CardRecord {
    /// A record with a name and type tags.
    #[must_use]
    pub fn new(name: impl Into<String>, types: &[&str]) -> Self {
        Self {
            name: name.into(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Set the cost string (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = Some(cost.into());
        self
    }

    /// Set produced mana tokens (builder pattern).
    #[must_use]
    pub fn with_produces(mut self, tokens: &[&str]) -> Self {
        self.produces = tokens.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Set power and toughness (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }
}

/// One triggered ability descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRecord {
    /// Event name, e.g. `etb`, `attack`, `upkeep`.
    pub event: String,
    #[serde(default)]
    pub condition: TriggerCondition,
    pub effect: Effect,
}

/// A deck list entry: a record and how many copies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    #[serde(default = "one")]
    pub count: u32,
    #[serde(flatten)]
    pub record: CardRecord,
}

fn one() -> u32 {
    1
}

/// An ordered multiset of card records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckList {
    pub cards: Vec<DeckEntry>,
    /// Starts in the command zone rather than the library.
    pub commander: Option<CardRecord>,
    /// Name of the card the policy steers mana toward. Defaults to the
    /// commander.
    pub marquee: Option<String>,
    /// Colors the land heuristic tries to cover. Inferred when absent.
    pub color_identity: Option<Vec<String>>,
}

impl DeckList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a deck list from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add `count` copies of a record (builder pattern).
    #[must_use]
    pub fn with_card(mut self, record: CardRecord, count: u32) -> Self {
        self.cards.push(DeckEntry { count, record });
        self
    }

    #[must_use]
    pub fn with_commander(mut self, record: CardRecord) -> Self {
        self.commander = Some(record);
        self
    }

    #[must_use]
    pub fn with_marquee(mut self, name: impl Into<String>) -> Self {
        self.marquee = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_color_identity(mut self, tokens: &[&str]) -> Self {
        self.color_identity = Some(tokens.iter().map(|t| (*t).to_string()).collect());
        self
    }

    /// Cards in the library-bound part of the list.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.iter().map(|e| e.count as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectTarget;

    #[test]
    fn test_record_defaults() {
        let rec: CardRecord = serde_json::from_str(r#"{"name": "Island", "types": ["land"]}"#).unwrap();
        assert_eq!(rec.name, "Island");
        assert!(rec.cost.is_none());
        assert!(rec.produces.is_empty());
        assert!(!rec.haste);
    }

    #[test]
    fn test_ability_record_with_tagged_effect() {
        let json = r#"{
            "name": "Impact Tremors",
            "types": ["enchantment"],
            "cost": "{1}{R}",
            "abilities": [
                {"event": "etb", "condition": "OtherSubject",
                 "effect": {"kind": "deal_damage", "amount": 1, "target": "opponent"}}
            ]
        }"#;
        let rec: CardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.abilities.len(), 1);
        assert_eq!(rec.abilities[0].condition, TriggerCondition::OtherSubject);
        assert_eq!(
            rec.abilities[0].effect,
            Effect::DealDamage {
                amount: 1,
                target: EffectTarget::Opponent
            }
        );
    }

    #[test]
    fn test_deck_list_builder() {
        let list = DeckList::new()
            .with_card(CardRecord::new("Forest", &["land"]).with_produces(&["G"]), 38)
            .with_commander(CardRecord::new("Omnath", &["legendary", "creature"]).with_cost("{2}{G}{G}"))
            .with_color_identity(&["G"]);
        assert_eq!(list.total_cards(), 38);
        assert!(list.commander.is_some());
    }

    #[test]
    fn test_invalid_json_is_serialize_error() {
        assert!(matches!(
            DeckList::from_json("{\"cards\": 5}"),
            Err(crate::core::SimError::Serialize(_))
        ));
    }
}
