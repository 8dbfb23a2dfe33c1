//! Effect targeting.
//!
//! Goldfish effects never choose among opponents' objects, so a target is a
//! fixed rule that picks permanents on our own board (or a player).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PermanentId;
use crate::zones::{BoardEconomy, Subdivision};

/// Who or what an effect applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    #[default]
    Opponent,
    /// The player running the deck.
    Controller,
    /// The permanent whose ability fired.
    Source,
    /// The permanent the triggering event is about.
    Subject,
    EachCreature,
    /// Every creature except the source.
    EachOtherCreature,
    /// The creature with the highest attack power, earliest on ties.
    StrongestCreature,
    /// The creature token with the lowest power, earliest on ties.
    WeakestToken,
}

impl EffectTarget {
    /// Does this target name a player rather than permanents?
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, EffectTarget::Opponent | EffectTarget::Controller)
    }

    /// The permanents this target picks right now. Players pick none.
    #[must_use]
    pub fn permanents(
        self,
        board: &BoardEconomy,
        source: Option<PermanentId>,
        subject: Option<PermanentId>,
    ) -> SmallVec<[PermanentId; 4]> {
        let in_play = |id: Option<PermanentId>| id.filter(|&id| board.battlefield().contains(id));
        let creatures = board.battlefield().ids_in(Subdivision::Creatures);

        match self {
            EffectTarget::Opponent | EffectTarget::Controller => SmallVec::new(),
            EffectTarget::Source => in_play(source).into_iter().collect(),
            EffectTarget::Subject => in_play(subject).into_iter().collect(),
            EffectTarget::EachCreature => creatures.iter().copied().collect(),
            EffectTarget::EachOtherCreature => creatures
                .iter()
                .copied()
                .filter(|&id| Some(id) != source)
                .collect(),
            EffectTarget::StrongestCreature => creatures
                .iter()
                .copied()
                .rev()
                .max_by_key(|&id| board.attack_power(id))
                .into_iter()
                .collect(),
            EffectTarget::WeakestToken => creatures
                .iter()
                .copied()
                .filter(|&id| board.permanent(id).is_some_and(|p| p.is_token()))
                .min_by_key(|&id| board.attack_power(id))
                .into_iter()
                .collect(),
        }
    }
}
