//! The floating mana pool: sources usable this turn.

use serde::{Deserialize, Serialize};

use super::color::ColorSet;
use super::cost::ManaCost;
use super::solver;
use super::source::ManaSource;
use crate::core::{PermanentId, SimResult};

/// A multiset of mana sources, rebuilt every untap step.
///
/// Sources that are not yet available (`available_from` in the future) stay
/// in the pool but are invisible to payments until their turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    sources: Vec<ManaSource>,
}

impl ManaPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from sources.
    #[must_use]
    pub fn from_sources(sources: Vec<ManaSource>) -> Self {
        Self { sources }
    }

    /// Add a source.
    pub fn add(&mut self, source: ManaSource) {
        self.sources.push(source);
    }

    /// Add several sources.
    pub fn extend(&mut self, sources: impl IntoIterator<Item = ManaSource>) {
        self.sources.extend(sources);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// All sources, available or not.
    #[must_use]
    pub fn sources(&self) -> &[ManaSource] {
        &self.sources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources that can be tapped on `turn`.
    #[must_use]
    pub fn available(&self, turn: u32) -> Vec<ManaSource> {
        self.sources
            .iter()
            .filter(|s| s.is_available(turn))
            .copied()
            .collect()
    }

    /// Count of sources that can be tapped on `turn`.
    #[must_use]
    pub fn available_count(&self, turn: u32) -> usize {
        self.sources.iter().filter(|s| s.is_available(turn)).count()
    }

    /// Union of colors producible on `turn`.
    #[must_use]
    pub fn colors_available(&self, turn: u32) -> ColorSet {
        self.sources
            .iter()
            .filter(|s| s.is_available(turn))
            .fold(ColorSet::EMPTY, |acc, s| acc.union(s.colors))
    }

    /// Can the sources available on `turn` pay `cost`?
    #[must_use]
    pub fn can_pay(&self, cost: &ManaCost, turn: u32) -> bool {
        solver::can_pay(cost, &self.available(turn))
    }

    /// Pay `cost` from the sources available on `turn`.
    ///
    /// Returns the consumed sources. The pool is only modified on success.
    pub fn pay(&mut self, cost: &ManaCost, turn: u32) -> SimResult<Vec<ManaSource>> {
        let positions: Vec<usize> = (0..self.sources.len())
            .filter(|&i| self.sources[i].is_available(turn))
            .collect();
        let available: Vec<ManaSource> = positions.iter().map(|&i| self.sources[i]).collect();

        let plan = solver::plan_payment(cost, &available)?;

        let mut taken: Vec<usize> = plan.iter().map(|&k| positions[k]).collect();
        taken.sort_unstable_by(|a, b| b.cmp(a));
        let mut consumed: Vec<ManaSource> = taken.into_iter().map(|i| self.sources.remove(i)).collect();
        consumed.reverse();
        Ok(consumed)
    }

    /// Take one available source produced by `origin`.
    pub fn take_from(&mut self, origin: PermanentId, turn: u32) -> Option<ManaSource> {
        let pos = self
            .sources
            .iter()
            .position(|s| s.origin == Some(origin) && s.is_available(turn))?;
        Some(self.sources.remove(pos))
    }

    /// Drop every source produced by `origin` (it left the battlefield).
    pub fn remove_origin(&mut self, origin: PermanentId) -> usize {
        let before = self.sources.len();
        self.sources.retain(|s| s.origin != Some(origin));
        before - self.sources.len()
    }
}
