//! Card definitions: static card data.
//!
//! `Card` holds the immutable, already-classified facts about a card:
//! its types, parsed cost, power/toughness, mana production and triggered
//! abilities. Every copy in play is a separate `Permanent` that points back
//! at a shared `Arc<Card>`.
//!
//! Cards are normally built from a `CardRecord` with [`Card::from_record`],
//! but tests and programmatic decks use the builder methods:
//!
//! ```
//! use rust_goldfish::cards::{Card, CardType};
//! use rust_goldfish::mana::{ColorSet, ManaColor, ManaCost};
//!
//! let elf = Card::creature("Llanowar Elves", ManaCost::parse("{G}").unwrap(), 1, 1)
//!     .producing(ColorSet::single(ManaColor::Green), 1);
//!
//! assert!(elf.is(CardType::Creature));
//! assert!(elf.is_mana_producer());
//! assert_eq!(elf.cost.mana_value(), 1);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::record::{AbilityRecord, CardRecord};
use crate::core::{SimError, SimResult};
use crate::effects::Effect;
use crate::mana::{ColorSet, ManaColor, ManaCost};
use crate::triggers::{EventKind, TriggerCondition};

/// Position of a card in its deck list.
///
/// Two copies of the same card have different IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The ID as a slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
}

impl CardType {
    /// Parse a type tag. Supertypes (`legendary`, `basic`, `snow`, ...) map
    /// to `Ok(None)` and are ignored.
    pub fn from_tag(tag: &str) -> Result<Option<Self>, ()> {
        let parsed = match tag.trim().to_ascii_lowercase().as_str() {
            "land" => CardType::Land,
            "creature" => CardType::Creature,
            "artifact" | "equipment" => CardType::Artifact,
            "enchantment" => CardType::Enchantment,
            "planeswalker" => CardType::Planeswalker,
            "instant" => CardType::Instant,
            "sorcery" => CardType::Sorcery,
            "legendary" | "basic" | "snow" | "world" | "tribal" | "kindred" => return Ok(None),
            _ => return Err(()),
        };
        Ok(Some(parsed))
    }

    /// Does this type stay on the battlefield?
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Combat keywords the simulator models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keywords {
    pub haste: bool,
    pub trample: bool,
    pub lifelink: bool,
}

/// A triggered ability attached to a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    /// Event that wakes the ability up.
    pub event: EventKind,
    /// Checked against the board when the event fires.
    pub condition: TriggerCondition,
    /// Resolved when the condition holds.
    pub effect: Effect,
}

impl TriggeredAbility {
    /// Create an ability that always fires on `event`.
    #[must_use]
    pub fn new(event: EventKind, effect: Effect) -> Self {
        Self {
            event,
            condition: TriggerCondition::Always,
            effect,
        }
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// Static card definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Card name. Also the key used for seeding and caching.
    pub name: String,
    /// Card types. Never empty.
    pub types: SmallVec<[CardType; 2]>,
    /// Attaches to creatures for `equip_cost`.
    pub is_equipment: bool,
    /// Cast cost.
    pub cost: ManaCost,
    pub power: i32,
    pub toughness: i32,
    /// Tokens this permanent taps for, if any.
    pub produces: Option<ColorSet>,
    /// Mana units produced per tap.
    pub produced_amount: u8,
    pub enters_tapped: bool,
    pub does_not_untap: bool,
    pub keywords: Keywords,
    /// Lets excess tokens be sacrificed at end of turn.
    pub sacrifice_outlet: bool,
    /// Lands fetched from the library onto the battlefield on resolution.
    pub puts_land: u8,
    /// Whether fetched lands enter tapped.
    pub fetched_land_tapped: bool,
    pub equip_cost: Option<ManaCost>,
    /// Power granted to the equipped creature.
    pub equip_power: i32,
    /// Starting loyalty for planeswalkers.
    pub loyalty: u8,
    /// Effects resolved when an instant or sorcery resolves.
    pub spell_effects: Vec<Effect>,
    pub abilities: Vec<TriggeredAbility>,
}

impl Card {
    /// Create a card with the given types and no cost.
    #[must_use]
    pub fn new(name: impl Into<String>, types: &[CardType]) -> Self {
        Self {
            name: name.into(),
            types: types.iter().copied().collect(),
            is_equipment: false,
            cost: ManaCost::FREE,
            power: 0,
            toughness: 0,
            produces: None,
            produced_amount: 0,
            enters_tapped: false,
            does_not_untap: false,
            keywords: Keywords::default(),
            sacrifice_outlet: false,
            puts_land: 0,
            fetched_land_tapped: false,
            equip_cost: None,
            equip_power: 0,
            loyalty: 0,
            spell_effects: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// A land tapping for one `color`.
    #[must_use]
    pub fn land(name: impl Into<String>, color: ManaColor) -> Self {
        Self::new(name, &[CardType::Land]).producing(ColorSet::single(color), 1)
    }

    /// A vanilla creature.
    #[must_use]
    pub fn creature(name: impl Into<String>, cost: ManaCost, power: i32, toughness: i32) -> Self {
        let mut card = Self::new(name, &[CardType::Creature]).with_cost(cost);
        card.power = power;
        card.toughness = toughness;
        card
    }

    /// Set the cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.cost = cost;
        self
    }

    /// Make this a mana producer (builder pattern).
    #[must_use]
    pub fn producing(mut self, colors: ColorSet, amount: u8) -> Self {
        self.produces = Some(colors);
        self.produced_amount = amount;
        self
    }

    #[must_use]
    pub fn entering_tapped(mut self) -> Self {
        self.enters_tapped = true;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    #[must_use]
    pub fn with_haste(mut self) -> Self {
        self.keywords.haste = true;
        self
    }

    #[must_use]
    pub fn with_sacrifice_outlet(mut self) -> Self {
        self.sacrifice_outlet = true;
        self
    }

    /// Fetch `count` lands on resolution (builder pattern).
    #[must_use]
    pub fn fetching_lands(mut self, count: u8, tapped: bool) -> Self {
        self.puts_land = count;
        self.fetched_land_tapped = tapped;
        self
    }

    /// Make this an equipment (builder pattern).
    #[must_use]
    pub fn as_equipment(mut self, equip_cost: ManaCost, equip_power: i32) -> Self {
        if !self.is(CardType::Artifact) {
            self.types.push(CardType::Artifact);
        }
        self.is_equipment = true;
        self.equip_cost = Some(equip_cost);
        self.equip_power = equip_power;
        self
    }

    /// Add a resolution effect (builder pattern).
    #[must_use]
    pub fn with_spell_effect(mut self, effect: Effect) -> Self {
        self.spell_effects.push(effect);
        self
    }

    /// Add a triggered ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: TriggeredAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Build a card from a classified record.
    ///
    /// Every error names the card so the driver can report which record
    /// broke a trial.
    pub fn from_record(record: &CardRecord) -> SimResult<Self> {
        let name = record.name.trim();
        let malformed = |reason: String| SimError::MalformedCardRecord {
            card: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(malformed("missing name".into()));
        }

        let mut types: SmallVec<[CardType; 2]> = SmallVec::new();
        let mut is_equipment = record.equipment;
        for tag in &record.types {
            if tag.trim().eq_ignore_ascii_case("equipment") {
                is_equipment = true;
            }
            match CardType::from_tag(tag) {
                Ok(Some(t)) if !types.contains(&t) => types.push(t),
                Ok(_) => {}
                Err(()) => return Err(malformed(format!("unknown card type {tag:?}"))),
            }
        }
        if is_equipment && !types.contains(&CardType::Artifact) {
            types.push(CardType::Artifact);
        }
        if types.is_empty() {
            return Err(malformed("no card types".into()));
        }

        let cost = Self::parse_cost(name, record.cost.as_deref().unwrap_or(""))?;

        let produces = if record.produces.is_empty() {
            None
        } else {
            let set = ColorSet::parse_tokens(&record.produces)
                .ok_or_else(|| malformed(format!("unknown mana token in {:?}", record.produces)))?;
            Some(set)
        };
        let produced_amount = match (produces, record.produced_amount) {
            (None, Some(n)) if n > 0 => {
                return Err(malformed("produced_amount without produced colors".into()));
            }
            (None, _) => 0,
            (Some(_), None) => 1,
            (Some(_), Some(n)) => n,
        };

        let equip_cost = match record.equip_cost.as_deref() {
            Some(text) => Some(Self::parse_cost(name, text)?),
            None if is_equipment => Some(ManaCost::FREE),
            None => None,
        };

        let abilities = record
            .abilities
            .iter()
            .map(|ability| Self::ability_from_record(name, ability))
            .collect::<SimResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            types,
            is_equipment,
            cost,
            power: record.power.unwrap_or(0),
            toughness: record.toughness.unwrap_or(0),
            produces,
            produced_amount,
            enters_tapped: record.enters_tapped,
            does_not_untap: record.does_not_untap,
            keywords: Keywords {
                haste: record.haste,
                trample: record.trample,
                lifelink: record.lifelink,
            },
            sacrifice_outlet: record.sacrifice_outlet,
            puts_land: record.puts_land,
            fetched_land_tapped: record.fetched_land_tapped,
            equip_cost,
            equip_power: record.equip_power,
            loyalty: record.loyalty.unwrap_or(0),
            spell_effects: record.spell_effects.clone(),
            abilities,
        })
    }

    /// Parse a cost string, attributing failures to `card`.
    pub fn parse_cost(card: &str, text: &str) -> SimResult<ManaCost> {
        ManaCost::parse(text).map_err(|err| match err {
            SimError::InvalidCostString { cost, .. } => SimError::InvalidCostString {
                card: card.to_string(),
                cost,
            },
            other => other,
        })
    }

    fn ability_from_record(card: &str, record: &AbilityRecord) -> SimResult<TriggeredAbility> {
        let event = EventKind::from_name(&record.event).ok_or_else(|| SimError::MalformedCardRecord {
            card: card.to_string(),
            reason: format!("unknown trigger event {:?}", record.event),
        })?;
        Ok(TriggeredAbility {
            event,
            condition: record.condition.clone(),
            effect: record.effect.clone(),
        })
    }

    /// Has this type?
    #[must_use]
    pub fn is(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.is(CardType::Land)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.is(CardType::Creature)
    }

    /// Stays on the battlefield when cast.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.types.iter().all(|t| t.is_permanent())
    }

    /// Taps for mana.
    #[must_use]
    pub fn is_mana_producer(&self) -> bool {
        self.produces.is_some() && self.produced_amount > 0
    }

    /// Mana added by resolving this spell, from its `AddMana` effects.
    #[must_use]
    pub fn ritual_mana(&self) -> u32 {
        self.spell_effects
            .iter()
            .map(|e| match e {
                Effect::AddMana { amount, .. } => u32::from(*amount),
                _ => 0,
            })
            .sum()
    }

    /// A non-permanent spell whose resolution adds mana.
    #[must_use]
    pub fn is_ritual(&self) -> bool {
        !self.is_permanent() && self.ritual_mana() > 0
    }

    /// Fetches lands onto the battlefield.
    #[must_use]
    pub fn fetches_lands(&self) -> bool {
        self.puts_land > 0
    }

    /// Has at least one ability triggered by its own arrival.
    #[must_use]
    pub fn has_etb_ability(&self) -> bool {
        self.abilities.iter().any(|a| a.event == EventKind::Etb)
    }

    /// Mana produced minus mana value. Positive for rocks that pay for
    /// themselves the turn they land.
    #[must_use]
    pub fn net_mana(&self) -> i32 {
        i32::from(self.produced_amount) - self.cost.mana_value() as i32
    }

    /// Colors this card asks for: cost colors plus produced colors.
    #[must_use]
    pub fn color_identity(&self) -> ColorSet {
        let produced = self
            .produces
            .map(|p| ColorSet::from_colors(p.tokens().filter(|c| c.is_colored())))
            .unwrap_or(ColorSet::EMPTY);
        self.cost.colors().union(produced)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.cost)
    }
}
