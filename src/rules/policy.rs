//! Greedy main-phase action policy.
//!
//! The policy is asked for one action at a time. It scans its rules in
//! order and returns the first legal, affordable action; the engine executes
//! it and asks again until the policy returns `None`:
//!
//! 1. a mana permanent that keeps the marquee castable this turn
//! 2. the marquee, casting rituals first if that makes it payable
//! 3. a land-fetching spell
//! 4. the cheapest creature, unless the hold-back rule vetoes it
//! 5. equip an unattached equipment, or cast one
//! 6. the cheapest remaining nonland spell
//!
//! In mana-only mode rules 4 to 6 are off.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::core::{EngineMode, HoldBackRule, PermanentId, SimConfig};
use crate::effects::{Effect, EffectTarget};
use crate::mana::{can_pay, spend, ColorSet, ManaCost, ManaSource, SourceKind};
use crate::zones::{BoardEconomy, Subdivision};

/// One main-phase decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    CastManaPermanent(CardId),
    CastRitual(CardId),
    CastMarquee(CardId),
    /// Cast the commander from the command zone.
    CastCommander,
    CastLandFetch(CardId),
    CastCreature(CardId),
    CastEquipment(CardId),
    Equip {
        equipment: PermanentId,
        creature: PermanentId,
    },
    CastSpell(CardId),
}

impl Action {
    /// The hand card this action casts, if any.
    #[must_use]
    pub fn card(self) -> Option<CardId> {
        match self {
            Action::CastManaPermanent(id)
            | Action::CastRitual(id)
            | Action::CastMarquee(id)
            | Action::CastLandFetch(id)
            | Action::CastCreature(id)
            | Action::CastEquipment(id)
            | Action::CastSpell(id) => Some(id),
            Action::CastCommander | Action::Equip { .. } => None,
        }
    }
}

/// Chooses the next main-phase action.
pub trait ActionPolicy {
    /// The next action to take, ignoring any in `skipped`. `None` ends the
    /// main phase.
    fn next_action(&self, board: &BoardEconomy, skipped: &[Action]) -> Option<Action>;
}

/// The default priority-ordered greedy policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreedyPolicy {
    mode: EngineMode,
    hold_back: HoldBackRule,
}

impl GreedyPolicy {
    #[must_use]
    pub fn new(mode: EngineMode, hold_back: HoldBackRule) -> Self {
        Self { mode, hold_back }
    }

    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.mode, config.hold_back)
    }

    /// The marquee, wherever it can be cast from, with its current cost.
    fn marquee(board: &BoardEconomy) -> Option<(Action, ManaCost)> {
        let deck = board.deck();
        deck.marquee()?;
        board
            .hand_cards()
            .find(|(_, c)| deck.is_marquee(c))
            .map(|(id, c)| (Action::CastMarquee(id), c.cost))
            .or_else(|| {
                board
                    .command_zone()
                    .filter(|c| deck.is_marquee(c))
                    .and(board.commander_cost())
                    .map(|cost| (Action::CastCommander, cost))
            })
    }

    /// Hand cards matching `pred`, excluding the marquee and skipped casts,
    /// that are payable now.
    fn castable<'b>(
        board: &'b BoardEconomy,
        skipped: &'b [Action],
        pred: impl Fn(&Card) -> bool + 'b,
    ) -> impl Iterator<Item = (CardId, &'b Arc<Card>)> + 'b {
        let turn = board.turn();
        board.hand_cards().filter(move |&(id, card)| {
            !card.is_land()
                && pred(&**card)
                && !board.deck().is_marquee(card)
                && !skipped.iter().any(|a| a.card() == Some(id))
                && board.pool().can_pay(&card.cost, turn)
        })
    }

    /// Would casting `card` now leave the marquee payable? True when the
    /// marquee is not payable to begin with.
    fn keeps_marquee(board: &BoardEconomy, card: &Card, marquee: Option<ManaCost>) -> bool {
        let Some(marquee) = marquee else {
            return true;
        };
        let available = board.pool().available(board.turn());
        if !can_pay(&marquee, &available) {
            return true;
        }
        let Ok(mut rest) = spend(&card.cost, &available) else {
            return false;
        };
        if let Some(colors) = card.produces {
            if !card.enters_tapped && !card.is_creature() {
                let source = ManaSource::new(colors, SourceKind::Rock);
                rest.extend(std::iter::repeat(source).take(usize::from(card.produced_amount)));
            }
        }
        can_pay(&marquee, &rest)
    }

    /// First ritual of a chain that makes `marquee` payable this turn.
    fn ritual_toward(board: &BoardEconomy, skipped: &[Action], marquee: &ManaCost) -> Option<CardId> {
        let mut rituals: Vec<(CardId, &Arc<Card>)> = board
            .hand_cards()
            .filter(|(id, c)| c.is_ritual() && !skipped.contains(&Action::CastRitual(*id)))
            .filter(|(_, c)| c.ritual_mana() > c.cost.mana_value())
            .collect();
        rituals.sort_by_key(|(_, c)| std::cmp::Reverse(c.ritual_mana() - c.cost.mana_value()));

        let mut available = board.pool().available(board.turn());
        let mut first = None;
        for (id, card) in rituals {
            let Ok(mut rest) = spend(&card.cost, &available) else {
                continue;
            };
            for effect in &card.spell_effects {
                if let Effect::AddMana { color, amount } = effect {
                    let source = ManaSource::new(ColorSet::single(*color), SourceKind::Ritual);
                    rest.extend(std::iter::repeat(source).take(usize::from(*amount)));
                }
            }
            available = rest;
            first.get_or_insert(id);
            if can_pay(marquee, &available) {
                return first;
            }
        }
        None
    }

    /// Hold-back veto for a creature about to be cast.
    fn vetoed(&self, board: &BoardEconomy, skipped: &[Action], card: &Card) -> bool {
        if card.keywords.haste || card.has_etb_ability() {
            return false;
        }
        let creatures = board.creature_count();
        if creatures >= self.hold_back.max_board_creatures {
            return true;
        }
        // Too few attackers to be worth showing: spend the mana elsewhere
        // first, and cast the creature once nothing else is left.
        creatures + 1 < self.hold_back.min_attackers
            && (Self::equip(board, skipped).is_some()
                || Self::castable(board, skipped, |c| c.is_equipment || Self::is_other_spell(c))
                    .next()
                    .is_some())
    }

    /// Nonland spells rule 6 casts.
    fn is_other_spell(card: &Card) -> bool {
        !card.is_creature()
            && !card.is_equipment
            && !card.is_mana_producer()
            && !card.is_ritual()
            && !card.fetches_lands()
    }

    fn cheapest<'b>(candidates: impl Iterator<Item = (CardId, &'b Arc<Card>)>) -> Option<CardId> {
        candidates
            .enumerate()
            .min_by_key(|(pos, (_, c))| (c.cost.mana_value(), *pos))
            .map(|(_, (id, _))| id)
    }

    fn equip(board: &BoardEconomy, skipped: &[Action]) -> Option<Action> {
        let creature = EffectTarget::StrongestCreature
            .permanents(board, None, None)
            .first()
            .copied()?;
        board
            .battlefield()
            .iter_in(Subdivision::Artifacts)
            .filter(|p| p.card.is_equipment && p.attached_to.is_none())
            .filter(|p| {
                let cost = p.card.equip_cost.unwrap_or(ManaCost::FREE);
                board.pool().can_pay(&cost, board.turn())
            })
            .map(|p| Action::Equip {
                equipment: p.id,
                creature,
            })
            .find(|a| !skipped.contains(a))
    }
}

impl ActionPolicy for GreedyPolicy {
    fn next_action(&self, board: &BoardEconomy, skipped: &[Action]) -> Option<Action> {
        let turn = board.turn();
        let marquee = Self::marquee(board).filter(|(a, _)| !skipped.contains(a));
        let marquee_cost = marquee.map(|(_, cost)| cost);

        // 1. Mana permanents: best net mana, then cheapest.
        let ramp = Self::castable(board, skipped, |c| c.is_permanent() && c.is_mana_producer())
            .filter(|(_, c)| Self::keeps_marquee(board, c, marquee_cost))
            .enumerate()
            .max_by_key(|(pos, (_, c))| {
                (
                    c.net_mana(),
                    std::cmp::Reverse(c.cost.mana_value()),
                    std::cmp::Reverse(*pos),
                )
            })
            .map(|(_, (id, _))| id);
        if let Some(id) = ramp {
            return Some(Action::CastManaPermanent(id));
        }

        // 2. Marquee.
        if let Some((action, cost)) = marquee {
            if board.pool().can_pay(&cost, turn) {
                return Some(action);
            }
            if let Some(id) = Self::ritual_toward(board, skipped, &cost) {
                debug!("ritual {id} toward the marquee on turn {turn}");
                return Some(Action::CastRitual(id));
            }
        }

        // 3. Land fetch.
        if let Some(id) = Self::cheapest(Self::castable(board, skipped, |c| {
            c.fetches_lands() && !c.is_permanent()
        })) {
            return Some(Action::CastLandFetch(id));
        }

        if !self.mode.simulates_board() {
            return None;
        }

        // 4. Creatures.
        let creature = Self::cheapest(Self::castable(board, skipped, |c| {
            c.is_creature() && !c.is_mana_producer() && !self.vetoed(board, skipped, c)
        }));
        if let Some(id) = creature {
            return Some(Action::CastCreature(id));
        }
        let commander_castable = !skipped.contains(&Action::CastCommander)
            && board
                .command_zone()
                .is_some_and(|c| !board.deck().is_marquee(c) && !self.vetoed(board, skipped, c))
            && board
                .commander_cost()
                .is_some_and(|cost| board.pool().can_pay(&cost, turn));
        if commander_castable {
            return Some(Action::CastCommander);
        }

        // 5. Equipment.
        if let Some(action) = Self::equip(board, skipped) {
            return Some(action);
        }
        if let Some(id) = Self::cheapest(Self::castable(board, skipped, |c| c.is_equipment)) {
            return Some(Action::CastEquipment(id));
        }

        // 6. Anything else worth casting.
        Self::cheapest(Self::castable(board, skipped, Self::is_other_spell)).map(Action::CastSpell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardType, Deck, TriggeredAbility};
    use crate::effects::Effect;
    use crate::mana::ManaColor;
    use crate::triggers::EventKind;

    fn policy() -> GreedyPolicy {
        GreedyPolicy::new(EngineMode::Full, HoldBackRule::default())
    }

    /// A board with `lands` untapped Plains in play and `hand` in hand.
    fn board_with(deck: Deck, lands: usize) -> BoardEconomy {
        let n = deck.len();
        let mut board = BoardEconomy::new(Arc::new(deck), 20, 20);
        board.draw(n).unwrap();
        let plains: Vec<CardId> = board
            .hand_cards()
            .filter(|(_, c)| c.is_land())
            .map(|(id, _)| id)
            .take(lands)
            .collect();
        for (turn, id) in plains.into_iter().enumerate() {
            board.begin_turn(turn as u32 + 1);
            board.play_land(id).unwrap();
        }
        board.rebuild_mana_pool();
        board
    }

    fn name_of(board: &BoardEconomy, action: Option<Action>) -> String {
        let id = action.and_then(Action::card).unwrap();
        board.deck().name(id).to_string()
    }

    fn plains() -> Card {
        Card::land("Plains", ManaColor::White)
    }

    fn white(cost: &str, name: &str) -> Card {
        Card::creature(name, ManaCost::parse(cost).unwrap(), 2, 2)
    }

    #[test]
    fn test_rock_before_creature() {
        let rock = Card::new("Mind Stone", &[CardType::Artifact])
            .with_cost(ManaCost::generic(2))
            .producing(ColorSet::single(ManaColor::Colorless), 1);
        let deck = Deck::from_cards([(plains(), 2), (white("{1}{W}", "Knight"), 1), (rock, 1)]);
        let board = board_with(deck, 2);
        assert_eq!(name_of(&board, policy().next_action(&board, &[])), "Mind Stone");
    }

    #[test]
    fn test_rock_vetoed_when_it_costs_the_marquee() {
        let rock = Card::new("Mind Stone", &[CardType::Artifact])
            .with_cost(ManaCost::generic(2))
            .producing(ColorSet::single(ManaColor::Colorless), 1)
            .entering_tapped();
        let deck = Deck::from_cards([(plains(), 3), (white("{2}{W}", "Angel"), 1), (rock, 1)])
            .with_marquee("Angel")
            .unwrap();
        let board = board_with(deck, 3);
        assert_eq!(name_of(&board, policy().next_action(&board, &[])), "Angel");
    }

    #[test]
    fn test_cheapest_creature_and_skips() {
        let deck = Deck::from_cards([(plains(), 3), (white("{2}{W}", "Big"), 1), (white("{W}", "Small"), 1)]);
        let board = board_with(deck, 3);
        let first = policy().next_action(&board, &[]);
        assert_eq!(name_of(&board, first), "Small");
        let second = policy().next_action(&board, &[first.unwrap()]);
        assert_eq!(name_of(&board, second), "Big");
    }

    #[test]
    fn test_ritual_enables_marquee() {
        let ritual = Card::new("Dark Ritual", &[CardType::Instant])
            .with_cost(ManaCost::parse("{W}").unwrap())
            .with_spell_effect(Effect::AddMana {
                color: ManaColor::White,
                amount: 3,
            });
        let deck = Deck::from_cards([(plains(), 1), (white("{2}{W}", "Angel"), 1), (ritual, 1)])
            .with_marquee("Angel")
            .unwrap();
        let board = board_with(deck, 1);
        let action = policy().next_action(&board, &[]);
        assert!(matches!(action, Some(Action::CastRitual(_))));
    }

    fn divination() -> Card {
        Card::new("Divination", &[CardType::Sorcery])
            .with_cost(ManaCost::parse("{W}").unwrap())
            .with_spell_effect(Effect::draw(2))
    }

    #[test]
    fn test_lone_creature_waits_for_other_spells() {
        let deck = Deck::from_cards([(plains(), 1), (white("{W}", "Recruit"), 1), (divination(), 1)]);
        let board = board_with(deck, 1);

        // Alone on the board, the creature yields to the sorcery.
        let action = policy().next_action(&board, &[]);
        assert!(matches!(action, Some(Action::CastSpell(_))));
        assert_eq!(name_of(&board, action), "Divination");

        // With nothing else to cast it comes down.
        let next = policy().next_action(&board, &[action.unwrap()]);
        assert_eq!(name_of(&board, next), "Recruit");

        let eager = GreedyPolicy::new(EngineMode::Full, HoldBackRule::never());
        assert_eq!(name_of(&board, eager.next_action(&board, &[])), "Recruit");
    }

    #[test]
    fn test_creature_joins_existing_attacker() {
        let deck = Deck::from_cards([(plains(), 1), (white("{W}", "Recruit"), 1), (divination(), 1)]);
        let mut board = board_with(deck, 1);
        board.create_token(&crate::cards::TokenTemplate::creature("Soldier", 1, 1), 1);

        let action = policy().next_action(&board, &[]);
        assert!(matches!(action, Some(Action::CastCreature(_))));
    }

    #[test]
    fn test_hold_back_veto() {
        let mut entries = vec![(plains(), 1), (white("{W}", "Recruit"), 1)];
        let herald = Card::creature("Herald", ManaCost::parse("{W}").unwrap(), 1, 1)
            .with_ability(TriggeredAbility::new(EventKind::Etb, Effect::draw(1)));
        entries.push((herald, 1));
        let mut board = board_with(Deck::from_cards(entries), 1);
        board.create_token(&crate::cards::TokenTemplate::creature("Soldier", 1, 1), 8);

        let action = policy().next_action(&board, &[]);
        assert_eq!(name_of(&board, action), "Herald");

        // Without the Herald the Recruit stays in hand.
        let skipped = [action.unwrap()];
        assert_eq!(policy().next_action(&board, &skipped), None);
    }

    #[test]
    fn test_mana_only_stops_after_rule_three() {
        let deck = Deck::from_cards([(plains(), 1), (white("{W}", "Recruit"), 1)]);
        let board = board_with(deck, 1);
        let mana_only = GreedyPolicy::new(EngineMode::ManaOnly, HoldBackRule::default());
        assert_eq!(mana_only.next_action(&board, &[]), None);
        assert!(policy().next_action(&board, &[]).is_some());
    }

    #[test]
    fn test_equip_strongest() {
        let sword = Card::new("Sword", &[CardType::Artifact]).as_equipment(ManaCost::generic(1), 2);
        let deck = Deck::from_cards([(plains(), 2), (sword, 1)]);
        let mut board = board_with(deck, 2);
        let sword = board.hand_cards().find(|(_, c)| c.is_equipment).map(|(id, _)| id).unwrap();
        let sword = board.play_spell(sword, &[]).unwrap();
        board.create_token(&crate::cards::TokenTemplate::creature("Goblin", 1, 1), 1);
        let beast = board.create_token(&crate::cards::TokenTemplate::creature("Beast", 3, 3), 1)[0];

        assert_eq!(
            policy().next_action(&board, &[]),
            Some(Action::Equip {
                equipment: sword,
                creature: beast
            })
        );
    }
}
