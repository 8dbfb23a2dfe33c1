//! Trigger events.
//!
//! A closed set of event kinds, one per point in the turn where goldfish
//! abilities can fire, plus the event value that carries what it is about.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::PermanentId;

/// Kinds of events triggered abilities listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A permanent entered the battlefield.
    Etb,
    /// A creature was declared as an attacker.
    Attack,
    /// A creature left the battlefield for the graveyard (tokens included).
    Death,
    CastSpell,
    Upkeep,
    BeginCombat,
    EndCombat,
    EndStep,
    LandPlayed,
    Draw,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Etb,
        EventKind::Attack,
        EventKind::Death,
        EventKind::CastSpell,
        EventKind::Upkeep,
        EventKind::BeginCombat,
        EventKind::EndCombat,
        EventKind::EndStep,
        EventKind::LandPlayed,
        EventKind::Draw,
    ];

    /// The record name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::Etb => "etb",
            EventKind::Attack => "attack",
            EventKind::Death => "death",
            EventKind::CastSpell => "cast_spell",
            EventKind::Upkeep => "upkeep",
            EventKind::BeginCombat => "begin_combat",
            EventKind::EndCombat => "end_combat",
            EventKind::EndStep => "end_step",
            EventKind::LandPlayed => "land_played",
            EventKind::Draw => "draw",
        }
    }

    /// Parse a record name. Case and surrounding whitespace are ignored;
    /// `enters` and `dies` are accepted as aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "enters" | "enter_battlefield" => return Some(EventKind::Etb),
            "dies" => return Some(EventKind::Death),
            "cast" => return Some(EventKind::CastSpell),
            _ => {}
        }
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that happened during a turn.
#[derive(Clone, Debug)]
pub struct TriggerEvent {
    pub kind: EventKind,
    /// The permanent the event is about, if it is (or was) on the battlefield.
    pub subject: Option<PermanentId>,
    /// The card the event is about: the permanent's template, or the spell.
    pub card: Option<Arc<Card>>,
    /// Is the subject a token?
    pub token: bool,
}

impl TriggerEvent {
    /// An event not about any object (upkeep, begin combat, ...).
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            subject: None,
            card: None,
            token: false,
        }
    }

    /// Set the subject permanent (builder pattern).
    #[must_use]
    pub fn with_subject(mut self, subject: PermanentId) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Set the subject card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: Arc<Card>) -> Self {
        self.card = Some(card);
        self
    }

    /// Mark the subject as a token (builder pattern).
    #[must_use]
    pub fn as_token(mut self) -> Self {
        self.token = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(EventKind::from_name("etb"), Some(EventKind::Etb));
        assert_eq!(EventKind::from_name(" End_Step "), Some(EventKind::EndStep));
        assert_eq!(EventKind::from_name("dies"), Some(EventKind::Death));
        assert_eq!(EventKind::from_name("scry"), None);
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_serde_names_match() {
        let json = serde_json::to_string(&EventKind::CastSpell).unwrap();
        assert_eq!(json, "\"cast_spell\"");
    }

    #[test]
    fn test_event_builder() {
        let event = TriggerEvent::new(EventKind::Etb).with_subject(PermanentId(3)).as_token();
        assert_eq!(event.subject, Some(PermanentId(3)));
        assert!(event.token);
        assert!(event.card.is_none());
    }
}
