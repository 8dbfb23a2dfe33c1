//! Turn engine: runs one trial through the fixed phase cycle.
//!
//! The engine owns the trial's board and trigger registry. Every board
//! mutation leaves zone moves in the board's journal; `settle` turns them
//! into trigger registrations and follow-up events, firing those breadth
//! first up to the configured depth.
//!
//! In [`EngineMode::ManaOnly`] the same loop runs with triggers and combat
//! switched off and the policy restricted to its mana rules.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;

use log::{debug, trace};

use super::lands::choose_land;
use super::phase::Phase;
use super::policy::{Action, ActionPolicy, GreedyPolicy};
use crate::cards::{Card, CardId, Deck};
use crate::core::{PermanentId, SimConfig, SimError, SimResult, TrialRng};
use crate::effects::{Effect, EffectContext, EffectResolver};
use crate::mana::ManaCost;
use crate::sim::TrialMetrics;
use crate::triggers::{EventKind, TriggerEvent, TriggerRegistry};
use crate::zones::{BoardEconomy, ZoneChange};

/// Work left over from zone moves.
enum Pending {
    Register(PermanentId, Arc<Card>),
    Unregister(PermanentId),
    Fire(TriggerEvent, usize),
}

/// Runs a single trial.
pub struct TurnEngine<'a, P: ActionPolicy = GreedyPolicy> {
    board: BoardEconomy,
    triggers: TriggerRegistry,
    policy: P,
    config: &'a SimConfig,
    trace: Option<&'a mut dyn Write>,
    metrics: TrialMetrics,
    combat_damage: i64,
}

/// Run one trial with the greedy policy.
pub fn run_trial(deck: Arc<Deck>, config: &SimConfig, seed: u64) -> SimResult<TrialMetrics> {
    TurnEngine::new(deck, config, seed).run()
}

impl<'a> TurnEngine<'a, GreedyPolicy> {
    #[must_use]
    pub fn new(deck: Arc<Deck>, config: &'a SimConfig, seed: u64) -> Self {
        Self::with_policy(deck, config, seed, GreedyPolicy::from_config(config))
    }
}

impl<'a, P: ActionPolicy> TurnEngine<'a, P> {
    /// An engine with a fresh board and an empty trigger registry.
    #[must_use]
    pub fn with_policy(deck: Arc<Deck>, config: &'a SimConfig, seed: u64, policy: P) -> Self {
        Self {
            board: BoardEconomy::new(deck, config.starting_life, config.opponent_life),
            triggers: TriggerRegistry::new(),
            policy,
            config,
            trace: None,
            metrics: TrialMetrics::new(seed),
            combat_damage: 0,
        }
    }

    /// Write a human-readable turn log to `sink`.
    #[must_use]
    pub fn with_trace(mut self, sink: &'a mut dyn Write) -> Self {
        self.trace = Some(sink);
        self
    }

    #[must_use]
    pub fn board(&self) -> &BoardEconomy {
        &self.board
    }

    #[must_use]
    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    fn full(&self) -> bool {
        self.config.mode.simulates_board()
    }

    /// Shuffle, keep an opening hand and play every turn.
    ///
    /// Errors only for records that cannot be parsed; the trial is then
    /// abandoned as a whole.
    pub fn run(mut self) -> SimResult<TrialMetrics> {
        self.open_hand()?;
        for turn in 1..=self.config.max_turns {
            self.play_turn(turn)?;
        }
        Ok(self.finish())
    }

    /// Shuffle the library and draw an opening hand, mulliganing per the
    /// configured rule. Returns the number of mulligans taken.
    pub fn open_hand(&mut self) -> SimResult<usize> {
        let seed = self.metrics.seed;
        let rng = TrialRng::new(seed);
        self.board.shuffle_library(&mut rng.for_context("library"));
        let mulligans = self.board.mulligan(
            self.config.opening_hand_size,
            &self.config.mulligan,
            &mut rng.for_context("mulligan"),
        )?;
        self.note(format_args!(
            "seed {seed} ({}): kept {} cards after {mulligans} mulligan(s)",
            self.config.mode.label(),
            self.board.hand().len()
        ));
        Ok(mulligans)
    }

    /// Close the trial and hand back its measurements.
    #[must_use]
    pub fn finish(mut self) -> TrialMetrics {
        self.metrics.finish(&self.board);
        self.metrics
    }

    /// Play one full turn.
    pub fn play_turn(&mut self, turn: u32) -> SimResult<()> {
        self.board.begin_turn(turn);
        self.combat_damage = 0;
        self.note(format_args!("turn {turn}"));

        let mut phase = Some(Phase::Untap);
        while let Some(current) = phase {
            self.step(current, turn)?;
            phase = current.next();
        }

        self.board.assert_conserved();
        self.metrics.snapshot(&self.board, self.combat_damage, self.config.starting_life);
        if self.board.opponent_life() <= 0 {
            self.metrics.mark_win(turn);
        }
        self.note(format_args!(
            "  end of turn: {} lands, {} creatures, {} in hand, opponent at {}",
            self.board.lands_in_play(),
            self.board.creature_count(),
            self.board.hand().len(),
            self.board.opponent_life()
        ));
        Ok(())
    }

    fn step(&mut self, phase: Phase, turn: u32) -> SimResult<()> {
        trace!("turn {turn}: {phase}");
        if let Some(kind) = phase.event() {
            self.dispatch(TriggerEvent::new(kind))?;
        }
        match phase {
            Phase::Untap => {
                self.board.untap_all();
                self.board.rebuild_mana_pool();
            }
            Phase::Draw => {
                if !(turn == 1 && self.config.on_the_play) {
                    match self.board.draw_one() {
                        Ok(id) => {
                            let name = self.board.deck().name(id).to_string();
                            self.note(format_args!("  draw {name}"));
                        }
                        Err(SimError::EmptyLibrary) => {}
                        Err(err) => return Err(err),
                    }
                    self.settle()?;
                }
            }
            Phase::Main => self.main_phase()?,
            Phase::Combat => self.combat()?,
            Phase::End => self.end_step()?,
            Phase::Upkeep | Phase::BeginCombat | Phase::EndCombat => {}
        }
        Ok(())
    }

    // === Main phase ===

    fn main_phase(&mut self) -> SimResult<()> {
        if let Some(land) = choose_land(&self.board) {
            let name = self.board.deck().name(land).to_string();
            self.board.play_land(land)?;
            self.note(format_args!("  land {name}"));
            self.settle()?;
        }

        let mut skipped: Vec<Action> = Vec::new();
        for _ in 0..self.config.max_policy_steps {
            let Some(action) = self.policy.next_action(&self.board, &skipped) else {
                break;
            };
            match self.execute(action) {
                Ok(true) => {}
                Ok(false) => skipped.push(action),
                Err(SimError::UnpayableCost { cost }) => {
                    debug!("skipping {action:?}: cannot pay {cost}");
                    skipped.push(action);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Carry out one policy action. `Ok(false)` if it turned out to do
    /// nothing.
    fn execute(&mut self, action: Action) -> SimResult<bool> {
        match action {
            Action::CastCommander => self.cast_commander(),
            Action::Equip { equipment, creature } => self.equip(equipment, creature),
            Action::CastManaPermanent(id)
            | Action::CastRitual(id)
            | Action::CastMarquee(id)
            | Action::CastLandFetch(id)
            | Action::CastCreature(id)
            | Action::CastEquipment(id)
            | Action::CastSpell(id) => self.cast(id),
        }
    }

    fn cast(&mut self, id: CardId) -> SimResult<bool> {
        let card = Arc::clone(self.board.deck().card(id)?);
        let paid = self.board.pay(&card.cost)?;
        let permanent = self.board.play_spell(id, &paid);
        self.note(format_args!("  cast {} for {}", card.name, card.cost));
        if self.board.deck().is_marquee(&card) {
            self.metrics.mark_marquee(self.board.turn());
        }
        self.settle()?;

        if permanent.is_none() {
            let effects: Vec<Effect> = card
                .spell_effects
                .iter()
                .filter(|e| self.full() || e.is_mana())
                .cloned()
                .collect();
            if !effects.is_empty() {
                EffectResolver::resolve_all(&effects, &mut self.board, EffectContext::default())?;
            }
        }
        if card.fetches_lands() {
            let fetched = self
                .board
                .fetch_land_to_battlefield(card.puts_land, card.fetched_land_tapped);
            self.note(format_args!("  {} fetched {fetched} land(s)", card.name));
        }
        self.settle()?;
        Ok(true)
    }

    fn cast_commander(&mut self) -> SimResult<bool> {
        let (Some(card), Some(cost)) = (self.board.command_zone().cloned(), self.board.commander_cost()) else {
            return Ok(false);
        };
        let paid = self.board.pay(&cost)?;
        self.board.cast_commander(&paid);
        self.note(format_args!("  cast commander {} for {cost}", card.name));
        if self.board.deck().is_marquee(&card) {
            self.metrics.mark_marquee(self.board.turn());
        }
        self.settle()?;
        Ok(true)
    }

    fn equip(&mut self, equipment: PermanentId, creature: PermanentId) -> SimResult<bool> {
        let Some(cost) = self.board.permanent(equipment).map(|p| p.card.equip_cost.unwrap_or(ManaCost::FREE)) else {
            return Ok(false);
        };
        if !self.board.permanent(creature).is_some_and(|p| p.is_creature()) {
            return Ok(false);
        }
        self.board.pay(&cost)?;
        let attached = self.board.attach(equipment, creature);
        if attached {
            self.note(format_args!("  equip {equipment} to {creature}"));
        }
        Ok(attached)
    }

    // === Combat and end step ===

    fn combat(&mut self) -> SimResult<()> {
        if self.full() {
            let attackers: Vec<PermanentId> = self
                .board
                .creatures()
                .into_iter()
                .filter(|&id| self.board.permanent(id).is_some_and(|p| !p.is_summoning_sick()))
                .collect();
            for &id in &attackers {
                self.dispatch(TriggerEvent::new(EventKind::Attack).with_subject(id))?;
            }

            let mut damage = 0_i64;
            let mut lifelink = 0_i64;
            for id in attackers {
                let Some(attacker) = self.board.permanent(id) else {
                    continue;
                };
                let power = i64::from(self.board.attack_power(id).max(0));
                if attacker.card.keywords.lifelink {
                    lifelink += power;
                }
                damage += power;
            }
            self.combat_damage = self.board.damage_opponent(damage);
            self.board.gain_life(lifelink);
            if damage > 0 {
                self.note(format_args!(
                    "  attack for {damage}, opponent at {}",
                    self.board.opponent_life()
                ));
            }
        }
        self.board.age_creatures();
        Ok(())
    }

    fn end_step(&mut self) -> SimResult<()> {
        if self.full() {
            let mut doomed: Vec<PermanentId> = self
                .board
                .battlefield()
                .iter()
                .filter(|p| p.sacrifice_at_end)
                .map(|p| p.id)
                .collect();
            if self.board.has_sacrifice_outlet() {
                doomed.extend(
                    self.board
                        .battlefield()
                        .iter()
                        .filter(|p| p.is_token() && p.is_creature() && !p.sacrifice_at_end)
                        .filter(|p| !p.card.sacrifice_outlet && self.board.attack_power(p.id) <= 1)
                        .map(|p| p.id),
                );
            }
            for id in doomed {
                self.board.move_to_graveyard(id);
            }
            self.settle()?;
        }

        self.board.clear_temporary_effects();
        let discarded = self.board.discard_to_hand_size(self.config.max_hand_size);
        if discarded > 0 {
            self.note(format_args!("  discard {discarded}"));
        }
        Ok(())
    }

    // === Triggers ===

    /// Fire an event, then everything it causes.
    fn dispatch(&mut self, event: TriggerEvent) -> SimResult<()> {
        if !self.full() {
            return Ok(());
        }
        self.drain(VecDeque::from([Pending::Fire(event, 0)]))
    }

    /// Process the zone moves made since the last call.
    fn settle(&mut self) -> SimResult<()> {
        let mut queue = VecDeque::new();
        self.collect(&mut queue, 0);
        self.drain(queue)
    }

    fn drain(&mut self, mut queue: VecDeque<Pending>) -> SimResult<()> {
        while let Some(item) = queue.pop_front() {
            match item {
                Pending::Register(id, card) => {
                    self.triggers.register_card(id, &card);
                }
                Pending::Unregister(id) => {
                    self.triggers.remove_for_source(id);
                }
                Pending::Fire(event, depth) => {
                    if depth > self.config.max_trigger_depth {
                        debug!("dropping {} trigger at depth {depth}", event.kind);
                        continue;
                    }
                    let outcome = self.triggers.fire(&event, &mut self.board)?;
                    if outcome.damage > 0 || outcome.token_count() > 0 {
                        trace!("{} triggers: {outcome:?}", event.kind);
                    }
                    self.collect(&mut queue, depth + 1);
                }
            }
        }
        Ok(())
    }

    /// Turn journal entries into queued work.
    fn collect(&mut self, queue: &mut VecDeque<Pending>, depth: usize) {
        let changes = self.board.drain_zone_changes();
        if !self.full() {
            return;
        }
        for change in changes {
            match change {
                ZoneChange::Entered { id, card, token } => {
                    queue.push_back(Pending::Register(id, Arc::clone(&card)));
                    let mut event = TriggerEvent::new(EventKind::Etb).with_subject(id).with_card(card);
                    if token {
                        event = event.as_token();
                    }
                    queue.push_back(Pending::Fire(event, depth));
                }
                ZoneChange::SpellCast { card, permanent } => {
                    let mut event = TriggerEvent::new(EventKind::CastSpell).with_card(card);
                    if let Some(id) = permanent {
                        event = event.with_subject(id);
                    }
                    queue.push_back(Pending::Fire(event, depth));
                }
                ZoneChange::LandPlayed { id } => {
                    queue.push_back(Pending::Fire(TriggerEvent::new(EventKind::LandPlayed).with_subject(id), depth));
                }
                ZoneChange::Drew(_) => {
                    queue.push_back(Pending::Fire(TriggerEvent::new(EventKind::Draw), depth));
                }
                ZoneChange::Left { id, card, token, died } => {
                    if died {
                        let mut event = TriggerEvent::new(EventKind::Death).with_subject(id).with_card(card);
                        if token {
                            event = event.as_token();
                        }
                        queue.push_back(Pending::Fire(event, depth));
                    }
                    queue.push_back(Pending::Unregister(id));
                }
            }
        }
    }

    fn note(&mut self, args: std::fmt::Arguments<'_>) {
        let Some(sink) = self.trace.as_mut() else {
            return;
        };
        if let Err(err) = writeln!(sink, "{args}") {
            debug!("trace sink failed, disabling: {err}");
            self.trace = None;
        }
    }
}

impl<P: ActionPolicy> std::fmt::Debug for TurnEngine<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("turn", &self.board.turn())
            .field("mode", &self.config.mode)
            .field("triggers", &self.triggers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardType, TokenTemplate, TriggeredAbility};
    use crate::core::{EngineMode, MulliganRule};
    use crate::mana::{ColorSet, ManaColor};
    use crate::sim::Metric;

    fn plains() -> Card {
        Card::land("Plains", ManaColor::White)
    }

    fn config(turns: u32) -> SimConfig {
        SimConfig::default()
            .with_max_turns(turns)
            .with_mulligan(MulliganRule::never())
    }

    fn lions() -> Card {
        Card::creature("Lions", ManaCost::parse("{W}").unwrap(), 2, 1)
    }

    #[test]
    fn test_trial_is_reproducible() {
        let deck = Arc::new(Deck::from_cards([(plains(), 20), (lions(), 20)]));
        let config = config(6);
        let a = run_trial(Arc::clone(&deck), &config, 11).unwrap();
        let b = run_trial(deck, &config, 11).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.turns(), 6);
    }

    #[test]
    fn test_one_land_per_turn() {
        let deck = Arc::new(Deck::from_cards([(plains(), 40)]));
        let metrics = run_trial(deck, &config(5), 1).unwrap();
        assert_eq!(metrics.series(Metric::LandsInPlay), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(metrics.land_drops, 5);
    }

    #[test]
    fn test_creatures_attack_after_a_turn() {
        // Library order is deck order with the seed's shuffle; an all-Lions
        // hand plus Plains on top makes the curve exact.
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (lions(), 1)]));
        let config = config(3).with_on_the_play(true);
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();

        engine.play_turn(1).unwrap();
        assert_eq!(engine.board.creature_count(), 1);
        assert_eq!(engine.board.opponent_life(), 40);
        engine.play_turn(2).unwrap();
        assert_eq!(engine.board.opponent_life(), 38);
        assert_eq!(engine.metrics.at(Metric::CombatDamage, 2), Some(2.0));
    }

    #[test]
    fn test_haste_attacks_immediately() {
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (lions().with_haste(), 1)]));
        let config = config(1);
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        assert_eq!(engine.board.opponent_life(), 38);
    }

    #[test]
    fn test_etb_token_trigger_and_follow_up() {
        let herald = Card::creature("Herald", ManaCost::parse("{W}").unwrap(), 1, 1).with_ability(
            TriggeredAbility::new(
                EventKind::Etb,
                Effect::tokens(TokenTemplate::creature("Soldier", 1, 1), 1),
            )
            .with_condition(crate::triggers::TriggerCondition::SelfIsSubject),
        );
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (herald, 1)]));
        let config = config(1);
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        assert_eq!(engine.board.creature_count(), 2);
        assert_eq!(engine.board.counters().tokens_created, 1);
        assert_eq!(engine.triggers().len(), 1);
    }

    #[test]
    fn test_trigger_loops_stop_at_depth() {
        // Every creature entering makes another token.
        let breeder = Card::creature("Breeder", ManaCost::parse("{W}").unwrap(), 0, 1).with_ability(
            TriggeredAbility::new(
                EventKind::Etb,
                Effect::tokens(TokenTemplate::creature("Spawn", 0, 1), 1),
            ),
        );
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (breeder, 1)]));
        let mut config = config(1);
        config.max_trigger_depth = 3;
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        // Breeder's own entry at depth 0, then tokens at depths 1..=3 each
        // make one more.
        assert_eq!(engine.board.counters().tokens_created, 4);
    }

    #[test]
    fn test_mana_only_skips_combat_and_triggers() {
        let herald = Card::creature("Herald", ManaCost::parse("{W}").unwrap(), 3, 3)
            .with_haste()
            .with_ability(TriggeredAbility::new(EventKind::Etb, Effect::damage(5)));
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (herald, 1)]));
        let config = config(1).with_mode(EngineMode::ManaOnly);
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        assert_eq!(engine.board.opponent_life(), 40);
        assert_eq!(engine.board.creature_count(), 0);
        assert!(engine.triggers().is_empty());
    }

    #[test]
    fn test_ritual_fetch_and_marquee() {
        let ritual = Card::new("Seething Song", &[CardType::Instant])
            .with_cost(ManaCost::parse("{W}").unwrap())
            .with_spell_effect(Effect::AddMana {
                color: ManaColor::White,
                amount: 3,
            });
        let dragon = Card::creature("Dragon", ManaCost::parse("{2}{W}").unwrap(), 5, 5);
        let deck = Deck::from_cards([(plains(), 1), (ritual, 1), (dragon, 1), (plains(), 1)])
            .with_marquee("Dragon")
            .unwrap();
        let config = config(1);
        let mut engine = TurnEngine::new(Arc::new(deck), &config, 0);
        engine.board.draw(3).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        assert_eq!(engine.metrics.marquee_turn, Some(1));
        assert!(engine
            .board
            .battlefield()
            .iter()
            .any(|p| p.card.name == "Dragon"));
    }

    #[test]
    fn test_trace_sink_gets_turn_log() {
        let deck = Arc::new(Deck::from_cards([(plains(), 10), (lions(), 10)]));
        let config = config(2);
        let mut out: Vec<u8> = Vec::new();
        TurnEngine::new(deck, &config, 5).with_trace(&mut out).run().unwrap();
        let log = String::from_utf8(out).unwrap();
        assert!(log.contains("turn 1"));
        assert!(log.contains("turn 2"));
        assert!(log.contains("land Plains"));
    }

    #[test]
    fn test_fetch_spell_ramps() {
        let ramp = Card::new("Rampant Growth", &[CardType::Sorcery])
            .with_cost(ManaCost::parse("{W}").unwrap())
            .fetching_lands(1, true);
        let deck = Arc::new(Deck::from_cards([(plains(), 1), (ramp, 1), (plains(), 3)]));
        let config = config(1);
        let mut engine = TurnEngine::new(deck, &config, 0);
        engine.board.draw(2).unwrap();
        engine.board.drain_zone_changes();
        engine.play_turn(1).unwrap();
        assert_eq!(engine.board.lands_in_play(), 2);
        assert_eq!(engine.board.counters().ramp_lands, 1);
        assert_eq!(engine.board.counters().land_drops, 1);
        let colors = engine.board.colors_in_play();
        assert_eq!(colors, ColorSet::single(ManaColor::White));
    }
}
