//! The battlefield: permanents by subdivision.
//!
//! Permanents are stored by ID and indexed by subdivision (lands,
//! creatures, artifacts, planeswalkers, other). Each subdivision keeps
//! arrival order, which is the only iteration order callers see, so
//! trials stay reproducible.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardType, Permanent};
use crate::core::PermanentId;

/// Where a permanent is filed on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subdivision {
    Lands,
    Creatures,
    Artifacts,
    Planeswalkers,
    Other,
}

impl Subdivision {
    pub const ALL: [Subdivision; 5] = [
        Subdivision::Lands,
        Subdivision::Creatures,
        Subdivision::Artifacts,
        Subdivision::Planeswalkers,
        Subdivision::Other,
    ];

    /// Subdivision for a card. Lands win over creatures (animated lands),
    /// creatures over artifacts (artifact creatures).
    #[must_use]
    pub fn of(card: &Card) -> Self {
        if card.is(CardType::Land) {
            Subdivision::Lands
        } else if card.is(CardType::Creature) {
            Subdivision::Creatures
        } else if card.is(CardType::Planeswalker) {
            Subdivision::Planeswalkers
        } else if card.is(CardType::Artifact) {
            Subdivision::Artifacts
        } else {
            Subdivision::Other
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// All permanents in play.
#[derive(Clone, Debug, Default)]
pub struct Battlefield {
    permanents: FxHashMap<PermanentId, Permanent>,
    order: [Vec<PermanentId>; 5],
}

impl Battlefield {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a permanent into play.
    ///
    /// Panics if the ID is already on the battlefield.
    pub fn insert(&mut self, permanent: Permanent) {
        let id = permanent.id;
        if self.permanents.contains_key(&id) {
            panic!("{id} already on the battlefield");
        }
        self.order[Subdivision::of(&permanent.card).index()].push(id);
        self.permanents.insert(id, permanent);
    }

    /// Take a permanent out of play.
    pub fn remove(&mut self, id: PermanentId) -> Option<Permanent> {
        let permanent = self.permanents.remove(&id)?;
        self.order[Subdivision::of(&permanent.card).index()].retain(|&p| p != id);
        Some(permanent)
    }

    #[must_use]
    pub fn get(&self, id: PermanentId) -> Option<&Permanent> {
        self.permanents.get(&id)
    }

    pub fn get_mut(&mut self, id: PermanentId) -> Option<&mut Permanent> {
        self.permanents.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: PermanentId) -> bool {
        self.permanents.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.permanents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permanents.is_empty()
    }

    /// IDs in one subdivision, in arrival order.
    #[must_use]
    pub fn ids_in(&self, subdivision: Subdivision) -> &[PermanentId] {
        &self.order[subdivision.index()]
    }

    /// Count in one subdivision.
    #[must_use]
    pub fn count(&self, subdivision: Subdivision) -> usize {
        self.order[subdivision.index()].len()
    }

    /// Every permanent, subdivision by subdivision, in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Permanent> + '_ {
        self.order
            .iter()
            .flatten()
            .filter_map(move |id| self.permanents.get(id))
    }

    /// Permanents in one subdivision, in arrival order.
    pub fn iter_in(&self, subdivision: Subdivision) -> impl Iterator<Item = &Permanent> + '_ {
        self.order[subdivision.index()]
            .iter()
            .filter_map(move |id| self.permanents.get(id))
    }

    /// Every ID, in the same order as [`Battlefield::iter`].
    #[must_use]
    pub fn ids(&self) -> Vec<PermanentId> {
        self.order.iter().flatten().copied().collect()
    }

    /// Mutable access to every permanent for order-independent updates.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Permanent> + '_ {
        self.permanents.values_mut()
    }

    /// Permanents that came from the deck (not tokens, not the commander).
    #[must_use]
    pub fn deck_card_count(&self) -> usize {
        self.permanents.values().filter(|p| p.card_id().is_some()).count()
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.permanents.values().filter(|p| p.is_token()).count()
    }
}
