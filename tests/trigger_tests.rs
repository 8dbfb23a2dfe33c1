//! Trigger system integration tests.
//!
//! These drive the registry directly against a board, the way the turn
//! engine does: zone moves from the board journal become events, events
//! fire triggers, trigger effects make more zone moves.

use std::sync::Arc;

use rust_goldfish::cards::{Card, CardType, Deck, TokenTemplate, TriggeredAbility};
use rust_goldfish::core::PermanentId;
use rust_goldfish::effects::{DoubleKind, Effect, EffectTarget};
use rust_goldfish::mana::ManaColor;
use rust_goldfish::triggers::{EventKind, Trigger, TriggerCondition, TriggerEvent, TriggerRegistry};
use rust_goldfish::zones::{BoardEconomy, ZoneChange};

fn board() -> BoardEconomy {
    let deck = Deck::from_cards([(Card::land("Mountain", ManaColor::Red), 20)]);
    BoardEconomy::new(Arc::new(deck), 40, 40)
}

fn goblin() -> TokenTemplate {
    TokenTemplate::creature("Goblin", 1, 1)
}

/// Fire an event for every token that entered since the last drain.
fn fire_entries(registry: &TriggerRegistry, board: &mut BoardEconomy) -> usize {
    let mut fired = 0;
    for change in board.drain_zone_changes() {
        if let ZoneChange::Entered { id, card, token } = change {
            let mut event = TriggerEvent::new(EventKind::Etb).with_subject(id).with_card(card);
            if token {
                event = event.as_token();
            }
            registry.fire(&event, board).unwrap();
            fired += 1;
        }
    }
    fired
}

/// Each creature entering pings the opponent.
#[test]
fn test_etb_damage_per_creature() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    registry.register(
        Trigger::new("Impact Tremors", EventKind::Etb, Effect::damage(1))
            .with_condition(TriggerCondition::SubjectIsCreature),
    );

    board.create_token(&goblin(), 3);
    assert_eq!(fire_entries(&registry, &mut board), 3);
    assert_eq!(board.opponent_life(), 37);
    assert_eq!(board.counters().damage_total, 3);
}

/// Token doubling applies to the tokens made earlier in the same firing.
#[test]
fn test_doubler_resolves_after_generation() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    registry.register(Trigger::new("Anointer", EventKind::Upkeep, Effect::Double { of: DoubleKind::Tokens }));
    registry.register(Trigger::new("Warren", EventKind::Upkeep, Effect::tokens(goblin(), 2)));

    let outcome = registry.fire(&TriggerEvent::new(EventKind::Upkeep), &mut board).unwrap();
    assert_eq!(outcome.token_count(), 4);
    assert_eq!(board.creature_count(), 4);
    assert_eq!(board.counters().tokens_created, 4);
}

/// Triggers from a permanent go away with it.
#[test]
fn test_leaving_unregisters_source() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    let artist = Card::creature("Blood Artist", Default::default(), 0, 1).with_ability(
        TriggeredAbility::new(EventKind::Death, Effect::damage(1))
            .with_condition(TriggerCondition::SubjectIsCreature),
    );
    let artist_id = board.create_token(&TokenTemplate::creature("Blood Artist", 0, 1), 1)[0];
    assert_eq!(registry.register_card(artist_id, &artist), 1);

    let tokens = board.create_token(&goblin(), 2);
    board.drain_zone_changes();

    // A goblin dies: one ping.
    assert!(board.move_to_graveyard(tokens[0]));
    for change in board.drain_zone_changes() {
        if let ZoneChange::Left { id, card, died: true, .. } = change {
            let event = TriggerEvent::new(EventKind::Death).with_subject(id).with_card(card).as_token();
            registry.fire(&event, &mut board).unwrap();
        }
    }
    assert_eq!(board.opponent_life(), 39);

    // The artist leaves; the next death does nothing.
    assert!(board.move_to_graveyard(artist_id));
    assert_eq!(registry.remove_for_source(artist_id), 1);
    assert!(registry.is_empty());

    assert!(board.move_to_graveyard(tokens[1]));
    let event = TriggerEvent::new(EventKind::Death).with_subject(tokens[1]).as_token();
    registry.fire(&event, &mut board).unwrap();
    assert_eq!(board.opponent_life(), 39);
    assert!(board.census().is_conserved());
}

/// Conditions see the board before any effect of the firing resolves.
#[test]
fn test_conditions_use_board_before_resolution() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    registry.register(Trigger::new("Muster", EventKind::BeginCombat, Effect::tokens(goblin(), 1)));
    registry.register(
        Trigger::new("Rally", EventKind::BeginCombat, Effect::damage(5))
            .with_condition(TriggerCondition::CreaturesAtLeast(1)),
    );

    registry.fire(&TriggerEvent::new(EventKind::BeginCombat), &mut board).unwrap();
    assert_eq!(board.creature_count(), 1);
    assert_eq!(board.opponent_life(), 40);

    registry.fire(&TriggerEvent::new(EventKind::BeginCombat), &mut board).unwrap();
    assert_eq!(board.opponent_life(), 35);
}

/// Self-only triggers ignore other permanents entering.
#[test]
fn test_self_is_subject() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    let source = board.create_token(&goblin(), 1)[0];
    board.drain_zone_changes();
    registry.register(
        Trigger::new("Siege-Gang", EventKind::Etb, Effect::tokens(goblin(), 3))
            .with_source(source)
            .with_condition(TriggerCondition::SelfIsSubject),
    );

    let other = TriggerEvent::new(EventKind::Etb).with_subject(PermanentId(999));
    registry.fire(&other, &mut board).unwrap();
    assert_eq!(board.creature_count(), 1);

    let own = TriggerEvent::new(EventKind::Etb).with_subject(source);
    registry.fire(&own, &mut board).unwrap();
    assert_eq!(board.creature_count(), 4);
}

/// Damage to creatures kills them when it reaches toughness.
#[test]
fn test_sweeper_kills_small_creatures() {
    let mut board = board();
    let mut registry = TriggerRegistry::new();
    board.create_token(&goblin(), 2);
    board.create_token(&TokenTemplate::creature("Ogre", 3, 3), 1);
    board.drain_zone_changes();
    registry.register(Trigger::new(
        "Pyroclasm",
        EventKind::EndStep,
        Effect::DealDamage {
            amount: 2,
            target: EffectTarget::EachCreature,
        },
    ));

    registry.fire(&TriggerEvent::new(EventKind::EndStep), &mut board).unwrap();
    assert_eq!(board.creature_count(), 1);
    assert_eq!(board.counters().tokens_destroyed, 2);
    let deaths = board
        .drain_zone_changes()
        .into_iter()
        .filter(|c| matches!(c, ZoneChange::Left { died: true, .. }))
        .count();
    assert_eq!(deaths, 2);
}

#[test]
fn test_card_abilities_register_per_event() {
    let mut registry = TriggerRegistry::new();
    let card = Card::new("Purphoros", &[CardType::Enchantment])
        .with_ability(TriggeredAbility::new(EventKind::Etb, Effect::damage(2)))
        .with_ability(TriggeredAbility::new(EventKind::Upkeep, Effect::GainLife { amount: 1 }));
    assert_eq!(registry.register_card(PermanentId(1), &card), 2);
    assert_eq!(registry.listening(EventKind::Etb), 1);
    assert_eq!(registry.listening(EventKind::Upkeep), 1);
    assert_eq!(registry.listening(EventKind::Death), 0);
}
