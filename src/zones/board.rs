//! Board economy: every zone and counter of one trial.
//!
//! `BoardEconomy` owns the library, hand, battlefield, graveyard, command
//! zone and the floating mana pool. Every mutator moves a card out of
//! exactly one zone and into exactly one zone, and is the only place the
//! matching counters change. Zone moves are also appended to a journal the
//! turn engine drains to register and remove triggers.
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_goldfish::cards::{Card, Deck};
//! use rust_goldfish::core::TrialRng;
//! use rust_goldfish::mana::{ManaColor, ManaCost};
//! use rust_goldfish::zones::BoardEconomy;
//!
//! let deck = Arc::new(Deck::from_cards([
//!     (Card::land("Plains", ManaColor::White), 20),
//!     (Card::creature("Lions", ManaCost::parse("{W}").unwrap(), 2, 1), 20),
//! ]));
//! let mut board = BoardEconomy::new(deck, 40, 40);
//! board.shuffle_library(&mut TrialRng::new(7));
//!
//! assert_eq!(board.draw(7).unwrap(), 7);
//! assert_eq!(board.hand().len(), 7);
//! assert!(board.census().is_conserved());
//! ```

use std::sync::Arc;

use im::Vector;
use log::trace;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::battlefield::{Battlefield, Subdivision};
use crate::cards::{Card, CardId, CardType, Deck, Permanent, PermanentOrigin, TokenTemplate};
use crate::core::{EntityAllocator, MulliganRule, PermanentId, SimError, SimResult, TrialRng};
use crate::mana::{ColorSet, ManaColor, ManaCost, ManaPool, ManaSource, SourceKind};

/// Generic mana added to the commander's cost per previous cast.
pub const COMMANDER_TAX: u8 = 2;

/// Where a card goes back into the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    Top,
    Bottom,
}

/// A zone move recorded for the turn engine.
#[derive(Clone, Debug)]
pub enum ZoneChange {
    /// A card moved from library to hand during play.
    Drew(CardId),
    /// A permanent entered the battlefield.
    Entered {
        id: PermanentId,
        card: Arc<Card>,
        token: bool,
    },
    /// A land entered through the land drop.
    LandPlayed { id: PermanentId },
    /// A spell was cast. `permanent` is set for permanent spells.
    SpellCast {
        card: Arc<Card>,
        permanent: Option<PermanentId>,
    },
    /// A permanent left the battlefield. `died` is set for creatures.
    Left {
        id: PermanentId,
        card: Arc<Card>,
        token: bool,
        died: bool,
    },
}

/// Scalar counters for one trial.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCounters {
    pub turn: u32,
    pub life: i64,
    pub opponent_life: i64,
    pub lands_played_this_turn: u32,
    pub spells_cast_this_turn: u32,
    /// Lands plus spells this turn.
    pub cards_played_this_turn: u32,
    pub damage_this_turn: i64,
    pub damage_total: i64,
    /// Lands entered through the once-per-turn land drop.
    pub land_drops: u32,
    /// Lands put onto the battlefield by spells and effects.
    pub ramp_lands: u32,
    pub tokens_created: u32,
    pub tokens_destroyed: u32,
    pub commander_casts: u32,
    pub mulligans: u32,
    pub discarded: u32,
}

/// Zone sizes, for the conservation invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub deck_size: usize,
    pub library: usize,
    pub hand: usize,
    /// Deck-origin permanents only.
    pub battlefield: usize,
    pub graveyard: usize,
    pub tokens_in_play: usize,
    pub tokens_created: u32,
    pub tokens_destroyed: u32,
    pub has_commander: bool,
    pub commander_in_command_zone: bool,
    pub commander_in_play: bool,
}

impl Census {
    /// Deck cards are all accounted for, token bookkeeping balances, and
    /// the commander is in exactly one place.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        let cards = self.library + self.hand + self.battlefield + self.graveyard == self.deck_size;
        let tokens = self.tokens_created as usize == self.tokens_destroyed as usize + self.tokens_in_play;
        let commander = usize::from(self.commander_in_command_zone) + usize::from(self.commander_in_play)
            == usize::from(self.has_commander);
        cards && tokens && commander
    }
}

/// All zones and counters of one trial.
#[derive(Clone, Debug)]
pub struct BoardEconomy {
    deck: Arc<Deck>,
    library: Vector<CardId>,
    hand: Vec<CardId>,
    battlefield: Battlefield,
    graveyard: Vec<CardId>,
    command_zone: Option<Arc<Card>>,
    pool: ManaPool,
    ids: EntityAllocator,
    counters: BoardCounters,
    journal: Vec<ZoneChange>,
}

impl BoardEconomy {
    /// A fresh board with the library in deck order.
    #[must_use]
    pub fn new(deck: Arc<Deck>, life: i64, opponent_life: i64) -> Self {
        let library = deck.ids().collect();
        let command_zone = deck.commander().cloned();
        Self {
            deck,
            library,
            hand: Vec::new(),
            battlefield: Battlefield::new(),
            graveyard: Vec::new(),
            command_zone,
            pool: ManaPool::new(),
            ids: EntityAllocator::new(),
            counters: BoardCounters {
                life,
                opponent_life,
                ..BoardCounters::default()
            },
            journal: Vec::new(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn deck(&self) -> &Arc<Deck> {
        &self.deck
    }

    #[must_use]
    pub fn counters(&self) -> &BoardCounters {
        &self.counters
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.counters.turn
    }

    #[must_use]
    pub fn life(&self) -> i64 {
        self.counters.life
    }

    #[must_use]
    pub fn opponent_life(&self) -> i64 {
        self.counters.opponent_life
    }

    #[must_use]
    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    /// Hand cards with their parsed templates, in hand order.
    pub fn hand_cards(&self) -> impl Iterator<Item = (CardId, &Arc<Card>)> + '_ {
        self.hand
            .iter()
            .filter_map(move |&id| self.deck.parsed(id).map(|card| (id, card)))
    }

    /// The library, top first. Cloning is cheap.
    #[must_use]
    pub fn library(&self) -> &Vector<CardId> {
        &self.library
    }

    #[must_use]
    pub fn graveyard(&self) -> &[CardId] {
        &self.graveyard
    }

    #[must_use]
    pub fn command_zone(&self) -> Option<&Arc<Card>> {
        self.command_zone.as_ref()
    }

    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    #[must_use]
    pub fn permanent(&self, id: PermanentId) -> Option<&Permanent> {
        self.battlefield.get(id)
    }

    #[must_use]
    pub fn pool(&self) -> &ManaPool {
        &self.pool
    }

    /// Creature IDs in arrival order.
    #[must_use]
    pub fn creatures(&self) -> Vec<PermanentId> {
        self.battlefield.ids_in(Subdivision::Creatures).to_vec()
    }

    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.battlefield.count(Subdivision::Creatures)
    }

    #[must_use]
    pub fn lands_in_play(&self) -> usize {
        self.battlefield.count(Subdivision::Lands)
    }

    /// Is a sacrifice outlet in play?
    #[must_use]
    pub fn has_sacrifice_outlet(&self) -> bool {
        self.battlefield.iter().any(|p| p.card.sacrifice_outlet)
    }

    /// Mana the permanents in play produce per turn, tapped or not.
    #[must_use]
    pub fn mana_potential(&self) -> u32 {
        self.battlefield
            .iter()
            .filter(|p| p.card.is_mana_producer())
            .map(|p| u32::from(p.card.produced_amount))
            .sum()
    }

    /// Union of colors the permanents in play can produce.
    #[must_use]
    pub fn colors_in_play(&self) -> ColorSet {
        self.battlefield
            .iter()
            .filter_map(|p| p.card.produces)
            .fold(ColorSet::EMPTY, ColorSet::union)
    }

    /// Power including attached equipment.
    #[must_use]
    pub fn attack_power(&self, id: PermanentId) -> i32 {
        let Some(creature) = self.battlefield.get(id) else {
            return 0;
        };
        let equipment: i32 = self
            .battlefield
            .iter_in(Subdivision::Artifacts)
            .filter(|p| p.attached_to == Some(id))
            .map(|p| p.card.equip_power)
            .sum();
        creature.power() + equipment
    }

    /// Cost to cast the commander now, tax included.
    #[must_use]
    pub fn commander_cost(&self) -> Option<ManaCost> {
        let tax = COMMANDER_TAX.saturating_mul(self.counters.commander_casts.min(100) as u8);
        self.command_zone.as_ref().map(|c| c.cost.plus_generic(tax))
    }

    /// Zone sizes right now.
    #[must_use]
    pub fn census(&self) -> Census {
        let commander_in_play = self
            .battlefield
            .iter()
            .any(|p| p.origin == PermanentOrigin::Commander);
        Census {
            deck_size: self.deck.len(),
            library: self.library.len(),
            hand: self.hand.len(),
            battlefield: self.battlefield.deck_card_count(),
            graveyard: self.graveyard.len(),
            tokens_in_play: self.battlefield.token_count(),
            tokens_created: self.counters.tokens_created,
            tokens_destroyed: self.counters.tokens_destroyed,
            has_commander: self.deck.commander().is_some(),
            commander_in_command_zone: self.command_zone.is_some(),
            commander_in_play,
        }
    }

    /// Panics if a card or token went missing.
    pub fn assert_conserved(&self) {
        let census = self.census();
        assert!(census.is_conserved(), "zone conservation violated: {census:?}");
    }

    /// Take the zone moves recorded since the last drain.
    pub fn drain_zone_changes(&mut self) -> Vec<ZoneChange> {
        std::mem::take(&mut self.journal)
    }

    // === Turn structure ===

    /// Start `turn`: reset the per-turn counters.
    pub fn begin_turn(&mut self, turn: u32) {
        let c = &mut self.counters;
        c.turn = turn;
        c.lands_played_this_turn = 0;
        c.spells_cast_this_turn = 0;
        c.cards_played_this_turn = 0;
        c.damage_this_turn = 0;
    }

    /// Untap everything except permanents that do not untap.
    pub fn untap_all(&mut self) {
        for permanent in self.battlefield.values_mut() {
            if !permanent.card.does_not_untap {
                permanent.tapped = false;
            }
        }
    }

    /// Refill the pool from untapped permanents. Floating mana is lost.
    pub fn rebuild_mana_pool(&mut self) {
        let turn = self.counters.turn;
        self.pool.clear();
        for permanent in self.battlefield.iter() {
            self.pool.extend(permanent.mana_sources(turn));
        }
    }

    /// Every creature survived another combat step.
    pub fn age_creatures(&mut self) {
        for permanent in self.battlefield.values_mut() {
            if permanent.is_creature() {
                permanent.turns_under_control += 1;
            }
        }
    }

    /// Drop until-end-of-turn buffs.
    pub fn clear_temporary_effects(&mut self) {
        for permanent in self.battlefield.values_mut() {
            permanent.temp_power = 0;
        }
    }

    // === Library and hand ===

    /// Shuffle the library.
    pub fn shuffle_library(&mut self, rng: &mut TrialRng) {
        let mut cards: Vec<CardId> = self.library.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.library = cards.into_iter().collect();
    }

    /// Draw the top card.
    ///
    /// The card reaches the hand even when its record is malformed; the
    /// error then aborts the trial with zones intact.
    pub fn draw_one(&mut self) -> SimResult<CardId> {
        let id = self.library.pop_front().ok_or(SimError::EmptyLibrary)?;
        self.hand.push(id);
        self.journal.push(ZoneChange::Drew(id));
        self.deck.card(id)?;
        Ok(id)
    }

    /// Draw up to `n` cards. Returns how many were drawn; an empty library
    /// stops the draw without an error.
    pub fn draw(&mut self, n: usize) -> SimResult<usize> {
        let mut drawn = 0;
        for _ in 0..n {
            match self.draw_one() {
                Ok(_) => drawn += 1,
                Err(SimError::EmptyLibrary) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(drawn)
    }

    /// Put a hand card back into the library.
    pub fn put_back(&mut self, id: CardId, position: ZonePosition) {
        self.take_from_hand(id);
        match position {
            ZonePosition::Top => self.library.push_front(id),
            ZonePosition::Bottom => self.library.push_back(id),
        }
    }

    /// Draw an opening hand with London mulligans.
    ///
    /// Redraws while the land count is outside the rule's range, then puts
    /// one card per mulligan on the bottom. Returns the mulligans taken.
    pub fn mulligan(&mut self, hand_size: usize, rule: &MulliganRule, rng: &mut TrialRng) -> SimResult<usize> {
        let mut taken = 0;
        loop {
            self.draw(hand_size)?;
            let lands = self.hand_land_count();
            if rule.keeps(lands) || taken >= rule.max_mulligans {
                break;
            }
            for id in std::mem::take(&mut self.hand) {
                self.library.push_back(id);
            }
            self.shuffle_library(rng);
            taken += 1;
        }

        for _ in 0..taken {
            if let Some(id) = self.bottom_choice(rule) {
                self.put_back(id, ZonePosition::Bottom);
            }
        }
        self.counters.mulligans = taken as u32;
        self.journal.clear();
        trace!("opening hand kept after {taken} mulligans");
        Ok(taken)
    }

    fn hand_land_count(&self) -> usize {
        self.hand_cards().filter(|(_, c)| c.is_land()).count()
    }

    /// Card to bottom after a mulligan: a land when the hand is land-heavy,
    /// otherwise the most expensive spell.
    fn bottom_choice(&self, rule: &MulliganRule) -> Option<CardId> {
        let lands = self.hand_land_count();
        let land_heavy = lands > rule.max_lands || lands * 2 > self.hand.len();
        if land_heavy {
            if let Some((id, _)) = self.hand_cards().filter(|(_, c)| c.is_land()).last() {
                return Some(id);
            }
        }
        self.most_expensive_in_hand(false)
            .or_else(|| self.hand.last().copied())
    }

    /// Most expensive hand card; lands only if `lands_ok` or nothing else.
    fn most_expensive_in_hand(&self, lands_ok: bool) -> Option<CardId> {
        self.hand_cards()
            .filter(|(_, c)| lands_ok || !c.is_land())
            .enumerate()
            .max_by_key(|(pos, (_, c))| (c.cost.mana_value(), *pos))
            .map(|(_, (id, _))| id)
    }

    /// Discard down to `max` cards: most expensive spells first, lands last.
    pub fn discard_to_hand_size(&mut self, max: usize) -> usize {
        let mut discarded = 0;
        while self.hand.len() > max {
            let Some(id) = self
                .most_expensive_in_hand(false)
                .or_else(|| self.most_expensive_in_hand(true))
                .or_else(|| self.hand.last().copied())
            else {
                break;
            };
            self.take_from_hand(id);
            self.graveyard.push(id);
            discarded += 1;
        }
        self.counters.discarded += discarded as u32;
        discarded
    }

    /// Remove a card from the hand. Panics if it is not there.
    fn take_from_hand(&mut self, id: CardId) -> Arc<Card> {
        let Some(pos) = self.hand.iter().position(|&c| c == id) else {
            panic!("{id} is not in hand");
        };
        self.hand.remove(pos);
        match self.deck.parsed(id) {
            Some(card) => Arc::clone(card),
            None => panic!("{id} in hand has no parsed card"),
        }
    }

    // === Playing cards ===

    /// Play a land from hand through the land drop.
    pub fn play_land(&mut self, id: CardId) -> SimResult<PermanentId> {
        if self.counters.lands_played_this_turn >= 1 {
            return Err(SimError::LandDropUsed);
        }
        let card = self.take_from_hand(id);
        assert!(card.is_land(), "{} is not a land", card.name);

        self.counters.lands_played_this_turn += 1;
        self.counters.cards_played_this_turn += 1;
        self.counters.land_drops += 1;
        let permanent = self.enter_battlefield(PermanentOrigin::Deck(id), card, false);
        self.journal.push(ZoneChange::LandPlayed { id: permanent });
        Ok(permanent)
    }

    /// Pay `cost` from the pool, tapping the permanents that produced the
    /// mana. Nothing changes on failure.
    pub fn pay(&mut self, cost: &ManaCost) -> SimResult<Vec<ManaSource>> {
        let paid = self.pool.pay(cost, self.counters.turn)?;
        for source in &paid {
            if let Some(permanent) = source.origin.and_then(|o| self.battlefield.get_mut(o)) {
                permanent.tapped = true;
            }
        }
        Ok(paid)
    }

    /// Cast a spell from hand with already-paid mana.
    ///
    /// Permanent spells enter the battlefield; instants and sorceries go to
    /// the graveyard and their effects are resolved by the caller.
    pub fn play_spell(&mut self, id: CardId, paid: &[ManaSource]) -> Option<PermanentId> {
        let card = self.take_from_hand(id);
        trace!("cast {} paying {} sources", card.name, paid.len());
        self.counters.spells_cast_this_turn += 1;
        self.counters.cards_played_this_turn += 1;

        if card.is_permanent() {
            let slot = self.journal.len();
            self.journal.push(ZoneChange::SpellCast {
                card: Arc::clone(&card),
                permanent: None,
            });
            let entered = self.enter_battlefield(PermanentOrigin::Deck(id), card, false);
            if let ZoneChange::SpellCast { permanent, .. } = &mut self.journal[slot] {
                *permanent = Some(entered);
            }
            Some(entered)
        } else {
            self.graveyard.push(id);
            self.journal.push(ZoneChange::SpellCast { card, permanent: None });
            None
        }
    }

    /// Cast the commander from the command zone with already-paid mana.
    ///
    /// Panics if the commander is not in the command zone.
    pub fn cast_commander(&mut self, paid: &[ManaSource]) -> PermanentId {
        let Some(card) = self.command_zone.take() else {
            panic!("commander is not in the command zone");
        };
        trace!("cast commander {} paying {} sources", card.name, paid.len());
        self.counters.commander_casts += 1;
        self.counters.spells_cast_this_turn += 1;
        self.counters.cards_played_this_turn += 1;
        self.journal.push(ZoneChange::SpellCast {
            card: Arc::clone(&card),
            permanent: None,
        });
        self.enter_battlefield(PermanentOrigin::Commander, card, false)
    }

    /// Create `count` tokens.
    pub fn create_token(&mut self, template: &TokenTemplate, count: u32) -> SmallVec<[PermanentId; 4]> {
        let card = Arc::new(template.to_card());
        let mut created = SmallVec::new();
        for _ in 0..count {
            self.counters.tokens_created += 1;
            let id = self.enter_battlefield(PermanentOrigin::Token, Arc::clone(&card), true);
            if let Some(token) = self.battlefield.get_mut(id) {
                token.sacrifice_at_end = template.sacrifice_at_end;
            }
            created.push(id);
        }
        created
    }

    /// Search the library for up to `count` lands and put them onto the
    /// battlefield. These do not use the land drop.
    ///
    /// Lands adding a color the board lacks come first, then more flexible
    /// lands, then library order.
    pub fn fetch_land_to_battlefield(&mut self, count: u8, tapped: bool) -> usize {
        let mut fetched = 0;
        for _ in 0..count {
            let missing = self.colors_in_play().missing_from(self.deck.color_identity());
            let best = self
                .library
                .iter()
                .enumerate()
                .filter_map(|(pos, &id)| self.deck.parsed(id).map(|c| (pos, c)))
                .filter(|(_, c)| c.is_land())
                .max_by_key(|(pos, c)| {
                    let produces = c.produces.unwrap_or(ColorSet::EMPTY);
                    let adds_missing = missing.colors().any(|m| produces.satisfies(m));
                    (adds_missing, produces.flexibility(), std::cmp::Reverse(*pos))
                })
                .map(|(pos, _)| pos);
            let Some(pos) = best else {
                break;
            };
            let id = self.library.remove(pos);
            let Some(card) = self.deck.parsed(id).cloned() else {
                break;
            };
            self.counters.ramp_lands += 1;
            let permanent = self.enter_battlefield(PermanentOrigin::Deck(id), card, false);
            if tapped {
                self.set_tapped(permanent);
            }
            fetched += 1;
        }
        fetched
    }

    fn enter_battlefield(&mut self, origin: PermanentOrigin, card: Arc<Card>, token: bool) -> PermanentId {
        let id = self.ids.next_id();
        let permanent = Permanent::new(id, origin, Arc::clone(&card));
        self.pool.extend(permanent.mana_sources(self.counters.turn));
        self.battlefield.insert(permanent);
        self.journal.push(ZoneChange::Entered { id, card, token });
        id
    }

    /// Tap a permanent and drop its unspent mana from the pool.
    pub fn set_tapped(&mut self, id: PermanentId) {
        if let Some(permanent) = self.battlefield.get_mut(id) {
            permanent.tapped = true;
            self.pool.remove_origin(id);
        }
    }

    /// Tap one source produced by `id`. `None` if it has nothing available.
    pub fn tap_for_mana(&mut self, id: PermanentId) -> Option<ManaSource> {
        let source = self.pool.take_from(id, self.counters.turn)?;
        if let Some(permanent) = self.battlefield.get_mut(id) {
            permanent.tapped = true;
        }
        Some(source)
    }

    /// Add one-shot mana from a resolved effect.
    pub fn add_mana(&mut self, color: ManaColor, amount: u8) {
        let source = ManaSource::new(ColorSet::single(color), SourceKind::Ritual)
            .available_from(self.counters.turn);
        self.pool.extend(std::iter::repeat(source).take(usize::from(amount)));
    }

    /// Move a permanent off the battlefield.
    ///
    /// Deck cards go to the graveyard, the commander to the command zone,
    /// tokens cease to exist. Returns `false` if it was not in play.
    pub fn move_to_graveyard(&mut self, id: PermanentId) -> bool {
        let Some(permanent) = self.battlefield.remove(id) else {
            return false;
        };
        self.pool.remove_origin(id);
        for other in self.battlefield.values_mut() {
            if other.attached_to == Some(id) {
                other.attached_to = None;
            }
        }
        match permanent.origin {
            PermanentOrigin::Deck(card_id) => self.graveyard.push(card_id),
            PermanentOrigin::Commander => self.command_zone = Some(Arc::clone(&permanent.card)),
            PermanentOrigin::Token => self.counters.tokens_destroyed += 1,
        }
        trace!("{} left the battlefield", permanent.card.name);
        self.journal.push(ZoneChange::Left {
            id,
            died: permanent.is_creature(),
            token: permanent.is_token(),
            card: permanent.card,
        });
        true
    }

    // === Board state changes ===

    /// Attach an equipment to a creature.
    pub fn attach(&mut self, equipment: PermanentId, creature: PermanentId) -> bool {
        if !self.battlefield.get(creature).is_some_and(Permanent::is_creature) {
            return false;
        }
        match self.battlefield.get_mut(equipment) {
            Some(e) if e.card.is_equipment => {
                e.attached_to = Some(creature);
                true
            }
            _ => false,
        }
    }

    /// Put +1/+1 counters on a permanent.
    pub fn add_plus_counters(&mut self, id: PermanentId, amount: i32) -> bool {
        match self.battlefield.get_mut(id) {
            Some(p) => {
                p.plus_counters += amount;
                true
            }
            None => false,
        }
    }

    /// Add loyalty to a planeswalker.
    pub fn add_loyalty(&mut self, id: PermanentId, amount: i32) -> bool {
        match self.battlefield.get_mut(id) {
            Some(p) if p.card.is(CardType::Planeswalker) => {
                p.loyalty += amount;
                true
            }
            _ => false,
        }
    }

    /// Give every creature a power buff until end of turn.
    pub fn pump_creatures(&mut self, amount: i32) {
        for permanent in self.battlefield.values_mut() {
            if permanent.is_creature() {
                permanent.temp_power += amount;
            }
        }
    }

    /// Damage the opponent. Returns the damage actually dealt.
    pub fn damage_opponent(&mut self, amount: i64) -> i64 {
        let amount = amount.max(0);
        self.counters.opponent_life -= amount;
        self.counters.damage_this_turn += amount;
        self.counters.damage_total += amount;
        amount
    }

    pub fn gain_life(&mut self, amount: i64) {
        self.counters.life += amount.max(0);
    }

    pub fn lose_life(&mut self, amount: i64) {
        self.counters.life -= amount.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains() -> Card {
        Card::land("Plains", ManaColor::White)
    }

    fn lions() -> Card {
        Card::creature("Lions", ManaCost::parse("{W}").unwrap(), 2, 1)
    }

    fn board_with(entries: Vec<(Card, usize)>) -> BoardEconomy {
        BoardEconomy::new(Arc::new(Deck::from_cards(entries)), 20, 20)
    }

    fn first_in_hand(board: &BoardEconomy, pred: impl Fn(&Card) -> bool) -> CardId {
        board.hand_cards().find(|&(_, c)| pred(&**c)).map(|(id, _)| id).unwrap()
    }

    #[test]
    fn test_draw_stops_at_empty_library() {
        let mut board = board_with(vec![(plains(), 3)]);
        assert_eq!(board.draw(5).unwrap(), 3);
        assert_eq!(board.draw_one(), Err(SimError::EmptyLibrary));
        assert!(board.census().is_conserved());
    }

    #[test]
    fn test_one_land_per_turn() {
        let mut board = board_with(vec![(plains(), 4)]);
        board.begin_turn(1);
        board.draw(4).unwrap();
        let first = board.hand()[0];
        let second = board.hand()[1];
        board.play_land(first).unwrap();
        assert_eq!(board.play_land(second), Err(SimError::LandDropUsed));
        assert_eq!(board.lands_in_play(), 1);
        assert_eq!(board.hand().len(), 3);

        board.begin_turn(2);
        board.play_land(second).unwrap();
        assert_eq!(board.counters().land_drops, 2);
    }

    #[test]
    fn test_pay_and_cast_creature() {
        let mut board = board_with(vec![(plains(), 1), (lions(), 1)]);
        board.begin_turn(1);
        board.draw(2).unwrap();
        let land = first_in_hand(&board, Card::is_land);
        let creature = first_in_hand(&board, Card::is_creature);

        let land_perm = board.play_land(land).unwrap();
        assert_eq!(board.pool().available_count(1), 1);

        let paid = board.pay(&ManaCost::parse("{W}").unwrap()).unwrap();
        assert!(board.permanent(land_perm).unwrap().tapped);
        let perm = board.play_spell(creature, &paid).unwrap();
        assert!(board.permanent(perm).unwrap().is_summoning_sick());
        assert_eq!(board.creature_count(), 1);
        assert_eq!(board.counters().cards_played_this_turn, 2);
        board.assert_conserved();

        let changes = board.drain_zone_changes();
        assert!(changes.iter().any(|c| matches!(c, ZoneChange::SpellCast { permanent: Some(p), .. } if *p == perm)));
        assert!(board.drain_zone_changes().is_empty());
    }

    #[test]
    fn test_failed_payment_changes_nothing() {
        let mut board = board_with(vec![(plains(), 1)]);
        board.begin_turn(1);
        board.draw(1).unwrap();
        let land = board.hand()[0];
        board.play_land(land).unwrap();
        assert!(board.pay(&ManaCost::parse("{W}{W}").unwrap()).is_err());
        assert_eq!(board.pool().len(), 1);
    }

    #[test]
    fn test_tokens_balance() {
        let mut board = board_with(vec![(plains(), 1)]);
        let ids = board.create_token(&TokenTemplate::creature("Soldier", 1, 1), 3);
        assert_eq!(ids.len(), 3);
        assert!(board.move_to_graveyard(ids[0]));
        assert!(!board.move_to_graveyard(ids[0]));
        let census = board.census();
        assert_eq!(census.tokens_created, 3);
        assert_eq!(census.tokens_destroyed, 1);
        assert_eq!(census.tokens_in_play, 2);
        assert!(census.is_conserved());
        assert!(board.graveyard().is_empty());
    }

    #[test]
    fn test_commander_returns_with_tax() {
        let deck = Deck::from_cards([(plains(), 5)])
            .with_commander(Card::creature("Cmdr", ManaCost::parse("{1}{W}").unwrap(), 3, 3));
        let mut board = BoardEconomy::new(Arc::new(deck), 40, 40);
        assert_eq!(board.commander_cost(), Some(ManaCost::parse("{1}{W}").unwrap()));

        let id = board.cast_commander(&[]);
        assert!(board.command_zone().is_none());
        board.assert_conserved();
        assert!(board.move_to_graveyard(id));
        assert!(board.command_zone().is_some());
        assert_eq!(board.commander_cost(), Some(ManaCost::parse("{3}{W}").unwrap()));
        board.assert_conserved();
    }

    #[test]
    fn test_fetch_land_is_not_a_land_drop() {
        let growth = Card::new("Rampant Growth", &[CardType::Sorcery])
            .with_cost(ManaCost::parse("{1}{G}").unwrap())
            .fetching_lands(1, true);
        let mut board = board_with(vec![(Card::land("Forest", ManaColor::Green), 5), (growth, 1)]);
        board.begin_turn(1);
        assert_eq!(board.fetch_land_to_battlefield(2, true), 2);
        assert_eq!(board.counters().ramp_lands, 2);
        assert_eq!(board.counters().land_drops, 0);
        assert_eq!(board.lands_in_play(), 2);
        assert!(board.battlefield().iter().all(|p| p.tapped));
        board.assert_conserved();
    }

    #[test]
    fn test_fetch_prefers_missing_color() {
        let mut board = board_with(vec![
            (Card::land("Forest", ManaColor::Green), 3),
            (Card::land("Island", ManaColor::Blue), 1),
            (Card::creature("Frog", ManaCost::parse("{G}{U}").unwrap(), 2, 2), 1),
        ]);
        board.begin_turn(1);
        board.fetch_land_to_battlefield(1, false);
        assert!(board.colors_in_play().contains(ManaColor::Green));
        board.fetch_land_to_battlefield(1, false);
        assert!(board.colors_in_play().contains(ManaColor::Blue));
    }

    #[test]
    fn test_discard_keeps_lands() {
        let bomb = Card::creature("Bomb", ManaCost::generic(7), 7, 7);
        let mut board = board_with(vec![(plains(), 5), (bomb, 4)]);
        board.draw(9).unwrap();
        assert_eq!(board.discard_to_hand_size(7), 2);
        assert_eq!(board.hand().len(), 7);
        assert_eq!(board.graveyard().len(), 2);
        assert_eq!(board.hand_land_count(), 5);
        board.assert_conserved();
    }

    #[test]
    fn test_mulligan_until_lands_in_range() {
        let mut board = board_with(vec![(plains(), 30), (lions(), 30)]);
        let mut rng = TrialRng::new(3);
        board.shuffle_library(&mut rng);
        let taken = board.mulligan(7, &MulliganRule::default(), &mut rng).unwrap();
        assert!(taken <= 2);
        assert_eq!(board.hand().len(), 7 - taken);
        assert_eq!(board.counters().mulligans as usize, taken);
        assert!(board.drain_zone_changes().is_empty());
        board.assert_conserved();
    }

    #[test]
    fn test_malformed_draw_keeps_zones_intact() {
        let list = crate::cards::DeckList::new()
            .with_card(crate::cards::CardRecord::new("Bad", &["creature"]).with_cost("{G}{?}"), 2);
        let deck = Deck::load(&list).unwrap();
        let mut board = BoardEconomy::new(Arc::new(deck), 20, 20);
        assert!(board.draw(1).unwrap_err().is_trial_fatal());
        assert_eq!(board.hand().len(), 1);
        board.assert_conserved();
    }

    #[test]
    fn test_tap_for_mana() {
        let mut board = board_with(vec![(plains(), 2)]);
        board.begin_turn(1);
        board.draw(2).unwrap();
        let first = board.hand()[0];
        let land = board.play_land(first).unwrap();

        let source = board.tap_for_mana(land).unwrap();
        assert!(source.colors.contains(ManaColor::White));
        assert!(board.permanent(land).unwrap().tapped);
        assert_eq!(board.pool().available_count(1), 0);
        assert_eq!(board.tap_for_mana(land), None);
    }

    #[test]
    fn test_equipment_bonus() {
        let sword = Card::new("Sword", &[CardType::Artifact]).as_equipment(ManaCost::generic(2), 2);
        let mut board = board_with(vec![(lions(), 1), (sword, 1)]);
        board.begin_turn(1);
        board.draw(2).unwrap();
        let lion = first_in_hand(&board, Card::is_creature);
        let sword = first_in_hand(&board, |c| c.is_equipment);
        let lion = board.play_spell(lion, &[]).unwrap();
        let sword = board.play_spell(sword, &[]).unwrap();
        assert!(board.attach(sword, lion));
        assert!(!board.attach(lion, sword));
        assert_eq!(board.attack_power(lion), 4);

        board.move_to_graveyard(lion);
        assert_eq!(board.permanent(sword).unwrap().attached_to, None);
    }
}
