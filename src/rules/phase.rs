//! Turn phases.

use serde::{Deserialize, Serialize};

use crate::triggers::EventKind;

/// One step of the fixed turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main,
    BeginCombat,
    Combat,
    EndCombat,
    End,
}

impl Phase {
    /// Every phase in turn order.
    pub const CYCLE: [Phase; 8] = [
        Phase::Untap,
        Phase::Upkeep,
        Phase::Draw,
        Phase::Main,
        Phase::BeginCombat,
        Phase::Combat,
        Phase::EndCombat,
        Phase::End,
    ];

    /// The phase after this one, `None` after `End`.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        let pos = Self::CYCLE.iter().position(|&p| p == self)?;
        Self::CYCLE.get(pos + 1).copied()
    }

    /// Event fired when the phase begins, for pure trigger points.
    #[must_use]
    pub const fn event(self) -> Option<EventKind> {
        match self {
            Phase::Upkeep => Some(EventKind::Upkeep),
            Phase::BeginCombat => Some(EventKind::BeginCombat),
            Phase::EndCombat => Some(EventKind::EndCombat),
            Phase::End => Some(EventKind::EndStep),
            Phase::Untap | Phase::Draw | Phase::Main | Phase::Combat => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Untap => "untap",
            Phase::Upkeep => "upkeep",
            Phase::Draw => "draw",
            Phase::Main => "main",
            Phase::BeginCombat => "begin combat",
            Phase::Combat => "combat",
            Phase::EndCombat => "end combat",
            Phase::End => "end",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
