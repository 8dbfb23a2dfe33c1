//! Turn engine integration tests.
//!
//! These drive whole trials turn by turn over many seeds and check the
//! board invariants after every turn: zone conservation, the one-land-per-
//! turn cap and commander bookkeeping.

use std::sync::Arc;

use rust_goldfish::cards::{Card, CardType, Deck, TokenTemplate, TriggeredAbility};
use rust_goldfish::core::{EngineMode, SimConfig};
use rust_goldfish::effects::{Effect, EffectTarget};
use rust_goldfish::mana::{ColorSet, ManaColor, ManaCost};
use rust_goldfish::rules::TurnEngine;
use rust_goldfish::sim::Metric;
use rust_goldfish::triggers::{EventKind, TriggerCondition};

fn cost(text: &str) -> ManaCost {
    ManaCost::parse(text).unwrap()
}

/// A token-heavy midrange list with every kind of card the engine knows.
fn kitchen_sink() -> Deck {
    let mind_stone = Card::new("Mind Stone", &[CardType::Artifact])
        .with_cost(cost("{2}"))
        .producing(ColorSet::single(ManaColor::Colorless), 1);
    let elf = Card::creature("Llanowar Elves", cost("{G}"), 1, 1).producing(ColorSet::single(ManaColor::Green), 1);
    let ritual = Card::new("Dark Ritual", &[CardType::Instant])
        .with_cost(cost("{B}"))
        .with_spell_effect(Effect::AddMana {
            color: ManaColor::Black,
            amount: 3,
        });
    let ramp = Card::new("Cultivate", &[CardType::Sorcery])
        .with_cost(cost("{2}{G}"))
        .fetching_lands(1, true);
    let herald = Card::creature("Herald", cost("{1}{G}"), 1, 1).with_ability(
        TriggeredAbility::new(
            EventKind::Etb,
            Effect::tokens(TokenTemplate::creature("Saproling", 1, 1), 2),
        )
        .with_condition(TriggerCondition::SelfIsSubject),
    );
    let outlet = Card::creature("Carrion Feeder", cost("{B}"), 1, 1).with_sacrifice_outlet();
    let artist = Card::creature("Blood Artist", cost("{1}{B}"), 0, 1).with_ability(
        TriggeredAbility::new(EventKind::Death, Effect::damage(1))
            .with_condition(TriggerCondition::SubjectIsCreature),
    );
    let warren = Card::new("Goblin Warren", &[CardType::Enchantment])
        .with_cost(cost("{2}{B}"))
        .with_ability(TriggeredAbility::new(
            EventKind::Upkeep,
            Effect::tokens(
                TokenTemplate::creature("Goblin", 1, 1).with_haste().sacrificed_at_end(),
                1,
            ),
        ));
    let sword = Card::new("Bonesplitter", &[CardType::Artifact])
        .with_cost(cost("{1}"))
        .as_equipment(cost("{1}"), 2);
    let scry = Card::new("Divination", &[CardType::Sorcery])
        .with_cost(cost("{2}{B}"))
        .with_spell_effect(Effect::draw(2));
    let bolt = Card::new("Fireblast", &[CardType::Instant])
        .with_cost(cost("{1}{B}"))
        .with_spell_effect(Effect::DealDamage {
            amount: 2,
            target: EffectTarget::Opponent,
        });
    let wurm = Card::creature("Craw Wurm", cost("{4}{G}{G}"), 6, 4);
    let commander = Card::creature("Meren", cost("{2}{B}{G}"), 3, 4);

    Deck::from_cards([
        (Card::land("Swamp", ManaColor::Black), 16),
        (Card::land("Forest", ManaColor::Green), 16),
        (Card::land("Command Tower", ManaColor::Any), 2),
        (Card::land("Tainted Wood", ManaColor::Black).entering_tapped(), 3),
        (mind_stone, 4),
        (elf, 6),
        (ritual, 4),
        (ramp, 6),
        (herald, 8),
        (outlet, 4),
        (artist, 4),
        (warren, 4),
        (sword, 4),
        (scry, 6),
        (bolt, 4),
        (wurm, 4),
    ])
    .with_commander(commander)
}

fn config(mode: EngineMode) -> SimConfig {
    SimConfig::default().with_max_turns(10).with_mode(mode)
}

fn check_trial(deck: &Arc<Deck>, config: &SimConfig, seed: u64) {
    let mut engine = TurnEngine::new(Arc::clone(deck), config, seed);
    engine.open_hand().unwrap();
    for turn in 1..=config.max_turns {
        engine.play_turn(turn).unwrap();

        let board = engine.board();
        let census = board.census();
        assert!(census.is_conserved(), "seed {seed} turn {turn}: {census:?}");
        assert!(census.commander_in_command_zone != census.commander_in_play);

        let counters = board.counters();
        assert!(counters.land_drops <= turn, "seed {seed}: {} drops by turn {turn}", counters.land_drops);
        assert!(
            board.lands_in_play() <= (counters.land_drops + counters.ramp_lands) as usize,
            "seed {seed} turn {turn}: lands without a drop or ramp"
        );
        assert!(board.hand().len() <= config.max_hand_size);
    }

    let metrics = engine.finish();
    assert_eq!(metrics.turns(), config.max_turns as usize);
    assert!(metrics.land_drops <= config.max_turns);
}

#[test]
fn test_full_engine_invariants_over_many_seeds() {
    let deck = Arc::new(kitchen_sink());
    let config = config(EngineMode::Full);
    for seed in 0..150 {
        check_trial(&deck, &config, seed * 7919);
    }
}

#[test]
fn test_mana_only_invariants_over_many_seeds() {
    let deck = Arc::new(kitchen_sink());
    let config = config(EngineMode::ManaOnly);
    for seed in 0..150 {
        check_trial(&deck, &config, seed * 104_729);
    }
}

#[test]
fn test_mana_only_never_deals_damage() {
    let deck = Arc::new(kitchen_sink());
    let config = config(EngineMode::ManaOnly);
    for seed in 0..40 {
        let mut engine = TurnEngine::new(Arc::clone(&deck), &config, seed);
        engine.open_hand().unwrap();
        for turn in 1..=config.max_turns {
            engine.play_turn(turn).unwrap();
        }
        assert!(engine.triggers().is_empty());
        let metrics = engine.finish();
        assert_eq!(metrics.total_damage, 0);
        assert_eq!(metrics.tokens_created, 0);
        assert!(metrics.series(Metric::CombatDamage).iter().all(|&d| d == 0.0));
    }
}

#[test]
fn test_tokens_are_created_and_cleaned_up() {
    let deck = Arc::new(kitchen_sink());
    let config = config(EngineMode::Full);
    let (mut created, mut destroyed) = (0, 0);
    for seed in 0..60 {
        let mut engine = TurnEngine::new(Arc::clone(&deck), &config, seed);
        engine.open_hand().unwrap();
        for turn in 1..=config.max_turns {
            engine.play_turn(turn).unwrap();
        }
        let metrics = engine.finish();
        assert!(metrics.tokens_destroyed <= metrics.tokens_created);
        created += metrics.tokens_created;
        destroyed += metrics.tokens_destroyed;
    }
    assert!(created > 0);
    assert!(destroyed > 0);
}

#[test]
fn test_commander_deck_eventually_casts_commander() {
    let deck = Arc::new(kitchen_sink());
    let config = config(EngineMode::Full);
    let cast = (0..60)
        .filter(|&seed| {
            let mut engine = TurnEngine::new(Arc::clone(&deck), &config, seed);
            engine.open_hand().unwrap();
            for turn in 1..=config.max_turns {
                engine.play_turn(turn).unwrap();
            }
            engine.finish().marquee_turn.is_some()
        })
        .count();
    // Four mana of the right colors by turn ten is near certain.
    assert!(cast > 40, "commander cast in only {cast} of 60 trials");
}
