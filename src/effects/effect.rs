//! Effect definitions.
//!
//! Effects are plain tagged data so card records can carry them in JSON:
//!
//! ```json
//! {"kind": "create_token", "template": {"name": "Goblin", "power": 1, "toughness": 1}, "count": 2}
//! ```
//!
//! One resolver interprets every variant; nothing here touches the board.

use serde::{Deserialize, Serialize};

use super::targeting::EffectTarget;
use crate::cards::TokenTemplate;
use crate::mana::ManaColor;

/// Counter kinds an effect can place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    PlusOne,
    Loyalty,
}

/// What a doubling effect repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleKind {
    /// Create the tokens created earlier in the same firing again.
    Tokens,
    /// Place the counters placed earlier in the same firing again.
    Counters,
    /// Deal the opponent damage dealt earlier in the same firing again.
    Damage,
}

/// Resolution tier. Higher priority resolves first within one firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Token and counter generation.
    Generation,
    Damage,
    /// Card draw, life, mana and buffs.
    Resource,
    /// Resolves last and repeats what the others produced.
    Doubling,
}

impl EffectCategory {
    /// Sort key: generation 3, damage 2, resource 1, doubling 0.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            EffectCategory::Generation => 3,
            EffectCategory::Damage => 2,
            EffectCategory::Resource => 1,
            EffectCategory::Doubling => 0,
        }
    }
}

/// An atomic effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Deal damage. Creatures die when it reaches their toughness.
    DealDamage {
        amount: i32,
        #[serde(default)]
        target: EffectTarget,
    },
    /// The controller gains life.
    GainLife { amount: i32 },
    /// The controller loses life.
    LoseLife { amount: i32 },
    CreateToken {
        template: TokenTemplate,
        #[serde(default = "one")]
        count: u32,
    },
    DrawCards { n: u32 },
    GrantCounter {
        counter: CounterKind,
        amount: i32,
        #[serde(default = "source")]
        target: EffectTarget,
    },
    /// One-shot mana, usable this turn.
    AddMana {
        color: ManaColor,
        amount: u8,
    },
    /// Every creature gets +N power until end of turn.
    PumpCreatures { amount: i32 },
    Sacrifice { target: EffectTarget },
    Double { of: DoubleKind },
}

fn one() -> u32 {
    1
}

fn source() -> EffectTarget {
    EffectTarget::Source
}

impl Effect {
    /// Damage to the opponent.
    #[must_use]
    pub fn damage(amount: i32) -> Self {
        Self::DealDamage {
            amount,
            target: EffectTarget::Opponent,
        }
    }

    #[must_use]
    pub fn tokens(template: TokenTemplate, count: u32) -> Self {
        Self::CreateToken { template, count }
    }

    #[must_use]
    pub fn draw(count: u32) -> Self {
        Self::DrawCards { n: count }
    }

    /// +1/+1 counters on the trigger's source.
    #[must_use]
    pub fn counters(amount: i32) -> Self {
        Self::GrantCounter {
            counter: CounterKind::PlusOne,
            amount,
            target: EffectTarget::Source,
        }
    }

    #[must_use]
    pub fn category(&self) -> EffectCategory {
        match self {
            Effect::CreateToken { .. } | Effect::GrantCounter { .. } => EffectCategory::Generation,
            Effect::DealDamage { .. } => EffectCategory::Damage,
            Effect::Double { .. } => EffectCategory::Doubling,
            Effect::GainLife { .. }
            | Effect::LoseLife { .. }
            | Effect::DrawCards { .. }
            | Effect::AddMana { .. }
            | Effect::PumpCreatures { .. }
            | Effect::Sacrifice { .. } => EffectCategory::Resource,
        }
    }

    /// Does this effect only touch mana?
    #[must_use]
    pub fn is_mana(&self) -> bool {
        matches!(self, Effect::AddMana { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_priorities() {
        let generation = Effect::tokens(TokenTemplate::creature("Goblin", 1, 1), 1).category();
        let damage = Effect::damage(1).category();
        let resource = Effect::draw(1).category();
        let doubling = Effect::Double { of: DoubleKind::Tokens }.category();
        assert!(generation.priority() > damage.priority());
        assert!(damage.priority() > resource.priority());
        assert!(resource.priority() > doubling.priority());
    }

    #[test]
    fn test_tagged_json() {
        let json = r#"{"kind": "create_token", "template": {"name": "Goblin", "power": 1, "toughness": 1}}"#;
        let effect: Effect = serde_json::from_str(json).unwrap();
        assert_eq!(effect, Effect::tokens(TokenTemplate::creature("Goblin", 1, 1), 1));

        let json = r#"{"kind": "grant_counter", "counter": "plus_one", "amount": 2}"#;
        assert_eq!(serde_json::from_str::<Effect>(json).unwrap(), Effect::counters(2));

        let json = r#"{"kind": "double", "of": "damage"}"#;
        assert_eq!(
            serde_json::from_str::<Effect>(json).unwrap(),
            Effect::Double { of: DoubleKind::Damage }
        );
    }

    #[test]
    fn test_damage_target_defaults_to_opponent() {
        let effect: Effect = serde_json::from_str(r#"{"kind": "deal_damage", "amount": 3}"#).unwrap();
        assert_eq!(effect, Effect::damage(3));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        assert!(serde_json::from_str::<Effect>(r#"{"kind": "exile_graveyard"}"#).is_err());
    }
}
