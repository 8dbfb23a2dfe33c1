//! Trigger conditions.
//!
//! Conditions filter which events of a kind actually fire an ability:
//! "whenever *another* creature enters", "whenever a *token* dies". They
//! are checked against the event and a read-only view of the board.

use serde::{Deserialize, Serialize};

use super::event::TriggerEvent;
use crate::cards::CardType;
use crate::core::PermanentId;
use crate::zones::BoardEconomy;

/// A condition that must hold for a trigger to fire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// No filter.
    #[default]
    Always,
    /// Disabled ability.
    Never,

    // === Subject filters ===
    /// The event is about the ability's own permanent.
    SelfIsSubject,
    /// The event is about some other permanent.
    OtherSubject,
    SubjectIsCreature,
    SubjectIsToken,
    SubjectIsNontoken,
    SubjectHasType(CardType),

    // === Board filters ===
    CreaturesAtLeast(usize),
    LandsAtLeast(usize),
    TurnAtLeast(u32),

    // === Combinators ===
    All(Vec<TriggerCondition>),
    Any(Vec<TriggerCondition>),
    Not(Box<TriggerCondition>),
}

impl TriggerCondition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
pub struct ConditionContext<'a> {
    pub event: &'a TriggerEvent,
    pub board: &'a BoardEconomy,
    /// The permanent that owns the ability being checked.
    pub source: Option<PermanentId>,
}

impl<'a> ConditionContext<'a> {
    pub fn new(event: &'a TriggerEvent, board: &'a BoardEconomy, source: Option<PermanentId>) -> Self {
        Self { event, board, source }
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        let event = ctx.event;
        match condition {
            TriggerCondition::Always => true,
            TriggerCondition::Never => false,

            TriggerCondition::SelfIsSubject => event.subject.is_some() && event.subject == ctx.source,
            TriggerCondition::OtherSubject => event.subject.is_some() && event.subject != ctx.source,

            TriggerCondition::SubjectIsCreature => event.card.as_ref().is_some_and(|c| c.is_creature()),
            TriggerCondition::SubjectIsToken => event.subject.is_some() && event.token,
            TriggerCondition::SubjectIsNontoken => event.card.is_some() && !event.token,
            TriggerCondition::SubjectHasType(t) => event.card.as_ref().is_some_and(|c| c.is(*t)),

            TriggerCondition::CreaturesAtLeast(n) => ctx.board.creature_count() >= *n,
            TriggerCondition::LandsAtLeast(n) => ctx.board.lands_in_play() >= *n,
            TriggerCondition::TurnAtLeast(turn) => ctx.board.turn() >= *turn,

            TriggerCondition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),
            TriggerCondition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),
            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),
        }
    }
}
