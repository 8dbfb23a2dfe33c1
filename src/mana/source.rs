//! Mana sources: one unit of producible mana.

use serde::{Deserialize, Serialize};

use super::color::{ColorSet, ManaColor};
use crate::core::PermanentId;

/// What kind of object produced a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Land,
    /// Noncreature artifact (or other noncreature permanent).
    Rock,
    /// Creature that taps for mana.
    Dork,
    /// One-shot mana from a resolved spell or effect.
    Ritual,
}

/// One unit of mana a permanent or ritual can provide this turn.
///
/// A permanent producing two mana contributes two sources with the same
/// origin. Sources are immutable; the pool either holds them or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaSource {
    /// Tokens this source can produce. Never empty.
    pub colors: ColorSet,
    /// First turn this source may be tapped.
    pub available_from: u32,
    /// Origin kind.
    pub kind: SourceKind,
    /// Producing permanent, `None` for rituals.
    pub origin: Option<PermanentId>,
}

impl ManaSource {
    /// Create a source available from turn 0.
    ///
    /// Panics on an empty color set; a source that produces nothing is a
    /// programming error upstream.
    #[must_use]
    pub fn new(colors: ColorSet, kind: SourceKind) -> Self {
        assert!(!colors.is_empty(), "mana source must produce at least one token");
        Self {
            colors,
            available_from: 0,
            kind,
            origin: None,
        }
    }

    /// Single-token land source. Convenient in tests.
    #[must_use]
    pub fn land(color: ManaColor) -> Self {
        Self::new(ColorSet::single(color), SourceKind::Land)
    }

    /// Set the first turn this source may be tapped (builder pattern).
    #[must_use]
    pub fn available_from(mut self, turn: u32) -> Self {
        self.available_from = turn;
        self
    }

    /// Set the producing permanent (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: PermanentId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Can this source be tapped on `turn`?
    #[must_use]
    pub fn is_available(&self, turn: u32) -> bool {
        self.available_from <= turn
    }

    /// See [`ColorSet::flexibility`].
    #[must_use]
    pub fn flexibility(&self) -> u32 {
        self.colors.flexibility()
    }
}

impl std::fmt::Display for ManaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.colors)?;
        if self.available_from > 0 {
            write!(f, "@t{}", self.available_from)?;
        }
        Ok(())
    }
}
