//! Decks: the immutable card multiset every trial starts from.
//!
//! A `Deck` is shared between worker threads as `Arc<Deck>`. Each slot keeps
//! its parse outcome rather than failing the whole load, so a malformed
//! record only aborts the trials that actually draw it.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use super::definition::{Card, CardId};
use super::record::DeckList;
use super::registry::CardCache;
use crate::core::{SimError, SimResult};
use crate::mana::ColorSet;

#[derive(Clone, Debug)]
struct DeckSlot {
    name: String,
    card: SimResult<Arc<Card>>,
}

/// An immutable deck definition.
///
/// ```
/// use rust_goldfish::cards::{Card, CardId, Deck};
/// use rust_goldfish::mana::{ManaColor, ManaCost};
///
/// let deck = Deck::from_cards([
///     (Card::land("Plains", ManaColor::White), 3),
///     (Card::creature("Lions", ManaCost::parse("{W}").unwrap(), 2, 1), 1),
/// ]);
///
/// assert_eq!(deck.len(), 4);
/// assert!(deck.card(CardId::new(0)).unwrap().is_land());
/// assert!(deck.color_identity().contains(ManaColor::White));
/// ```
#[derive(Clone, Debug)]
pub struct Deck {
    slots: Vec<DeckSlot>,
    commander: Option<Arc<Card>>,
    marquee: Option<String>,
    color_identity: ColorSet,
}

impl Deck {
    /// Build a deck from parsed cards and copy counts.
    pub fn from_cards(entries: impl IntoIterator<Item = (Card, usize)>) -> Self {
        let mut slots = Vec::new();
        for (card, count) in entries {
            let card = Arc::new(card);
            for _ in 0..count {
                slots.push(DeckSlot {
                    name: card.name.clone(),
                    card: Ok(Arc::clone(&card)),
                });
            }
        }
        let mut deck = Self {
            slots,
            commander: None,
            marquee: None,
            color_identity: ColorSet::EMPTY,
        };
        deck.color_identity = deck.inferred_identity();
        deck
    }

    /// Load a deck list with a throwaway cache.
    pub fn load(list: &DeckList) -> SimResult<Self> {
        Self::load_with_cache(list, &mut CardCache::new())
    }

    /// Load a deck list, parsing through the caller's cache.
    ///
    /// Malformed library cards are kept as failed slots. A malformed
    /// commander, a marquee that is not in the deck, or an empty library is
    /// an error, since every trial would hit it.
    pub fn load_with_cache(list: &DeckList, cache: &mut CardCache) -> SimResult<Self> {
        let mut slots = Vec::with_capacity(list.total_cards());
        for entry in &list.cards {
            let card = cache.get_or_parse(&entry.record);
            for _ in 0..entry.count {
                slots.push(DeckSlot {
                    name: entry.record.name.trim().to_string(),
                    card: card.clone(),
                });
            }
        }
        if slots.is_empty() {
            return Err(SimError::InvalidConfig("deck list has no cards".into()));
        }

        let commander = list
            .commander
            .as_ref()
            .map(|record| cache.get_or_parse(record))
            .transpose()?;

        let mut deck = Self {
            slots,
            commander,
            marquee: None,
            color_identity: ColorSet::EMPTY,
        };

        if let Some(name) = &list.marquee {
            deck = deck.with_marquee(name.trim())?;
        }

        deck.color_identity = match &list.color_identity {
            Some(tokens) => ColorSet::parse_tokens(tokens).ok_or_else(|| {
                SimError::InvalidConfig(format!("unknown color in identity {tokens:?}"))
            })?,
            None => deck.inferred_identity(),
        };
        Ok(deck)
    }

    /// Set the commander (builder pattern).
    #[must_use]
    pub fn with_commander(mut self, commander: Card) -> Self {
        self.commander = Some(Arc::new(commander));
        self.color_identity = self.inferred_identity();
        self
    }

    /// Designate the marquee spell by name.
    pub fn with_marquee(mut self, name: &str) -> SimResult<Self> {
        let known = self.slots.iter().any(|s| s.name == name)
            || self.commander.as_ref().is_some_and(|c| c.name == name);
        if !known {
            return Err(SimError::InvalidConfig(format!(
                "marquee {name:?} is neither in the deck nor the commander"
            )));
        }
        self.marquee = Some(name.to_string());
        Ok(self)
    }

    /// Override the color identity (builder pattern).
    #[must_use]
    pub fn with_color_identity(mut self, identity: ColorSet) -> Self {
        self.color_identity = identity;
        self
    }

    /// Commander colors if there is a commander, otherwise the colors of
    /// every parsed nonland card.
    fn inferred_identity(&self) -> ColorSet {
        if let Some(commander) = &self.commander {
            return commander.color_identity();
        }
        self.slots
            .iter()
            .filter_map(|s| s.card.as_ref().ok())
            .filter(|c| !c.is_land())
            .fold(ColorSet::EMPTY, |acc, c| acc.union(c.cost.colors()))
    }

    /// Number of cards that start in the library.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every slot ID in deck order.
    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        (0..self.slots.len()).map(|i| CardId::new(i as u32))
    }

    /// The parsed card in a slot, or the error its record produced.
    pub fn card(&self, id: CardId) -> SimResult<&Arc<Card>> {
        match self.slots.get(id.index()) {
            Some(slot) => slot.card.as_ref().map_err(Clone::clone),
            None => Err(SimError::MalformedCardRecord {
                card: id.to_string(),
                reason: "no such deck slot".into(),
            }),
        }
    }

    /// The parsed card in a slot, ignoring malformed slots.
    #[must_use]
    pub fn parsed(&self, id: CardId) -> Option<&Arc<Card>> {
        self.slots.get(id.index()).and_then(|s| s.card.as_ref().ok())
    }

    /// Name recorded for a slot, parsed or not.
    #[must_use]
    pub fn name(&self, id: CardId) -> &str {
        self.slots.get(id.index()).map_or("", |s| s.name.as_str())
    }

    #[must_use]
    pub fn commander(&self) -> Option<&Arc<Card>> {
        self.commander.as_ref()
    }

    /// The marquee name: explicit, or the commander's.
    #[must_use]
    pub fn marquee(&self) -> Option<&str> {
        self.marquee
            .as_deref()
            .or_else(|| self.commander.as_ref().map(|c| c.name.as_str()))
    }

    /// Is `card` the marquee spell?
    #[must_use]
    pub fn is_marquee(&self, card: &Card) -> bool {
        self.marquee() == Some(card.name.as_str())
    }

    #[must_use]
    pub fn color_identity(&self) -> ColorSet {
        self.color_identity
    }

    /// Slots whose record failed to parse.
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.card.is_err()).count()
    }

    /// Hash of the sorted card-name multiset (commander included).
    ///
    /// Reordering a deck list does not change it; changing any card does.
    #[must_use]
    pub fn seed_hash(&self) -> u64 {
        let mut names: Vec<&str> = self.slots.iter().map(|s| s.name.as_str()).collect();
        if let Some(commander) = &self.commander {
            names.push(commander.name.as_str());
        }
        names.sort_unstable();

        let mut hasher = FxHasher::default();
        names.len().hash(&mut hasher);
        for name in names {
            name.hash(&mut hasher);
        }
        hasher.finish()
    }
}
