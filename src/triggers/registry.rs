//! Trigger registry.
//!
//! The registry stores the triggered abilities of permanents currently in
//! play, indexed by event kind and by source. Each trial owns its own
//! registry; nothing is shared between trials.

use log::trace;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
use super::event::{EventKind, TriggerEvent};
use crate::cards::Card;
use crate::core::{PermanentId, SimResult};
use crate::effects::{Effect, EffectContext, EffectResolver, FireOutcome};
use crate::zones::BoardEconomy;

/// Unique identifier for a trigger. Allocation order is registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// A registered triggered ability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub id: TriggerId,
    /// Human-readable name (for traces).
    pub name: String,
    /// The permanent that owns this trigger. `None` for global triggers.
    pub source: Option<PermanentId>,
    pub event: EventKind,
    pub condition: TriggerCondition,
    pub effect: Effect,
    /// Resolution tier; higher fires first.
    pub priority: u8,
}

impl Trigger {
    /// A trigger with priority taken from its effect's category.
    pub fn new(name: impl Into<String>, event: EventKind, effect: Effect) -> Self {
        Self {
            id: TriggerId::new(0),
            name: name.into(),
            source: None,
            event,
            condition: TriggerCondition::Always,
            priority: effect.category().priority(),
            effect,
        }
    }

    /// Set the source permanent (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: PermanentId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// A trigger whose condition passed, ready to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggeredEffect {
    pub trigger_id: TriggerId,
    pub source: Option<PermanentId>,
    pub effect: Effect,
    pub priority: u8,
}

/// Per-trial storage for triggers.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    triggers: FxHashMap<TriggerId, Trigger>,
    by_event: FxHashMap<EventKind, Vec<TriggerId>>,
    by_source: FxHashMap<PermanentId, Vec<TriggerId>>,
    next_id: u32,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger, assigning it the next ID.
    pub fn register(&mut self, mut trigger: Trigger) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        trigger.id = id;

        self.by_event.entry(trigger.event).or_default().push(id);
        if let Some(source) = trigger.source {
            self.by_source.entry(source).or_default().push(id);
        }
        self.triggers.insert(id, trigger);
        id
    }

    /// Register every triggered ability printed on `card` for `source`.
    pub fn register_card(&mut self, source: PermanentId, card: &Card) -> usize {
        for ability in &card.abilities {
            let trigger = Trigger::new(card.name.clone(), ability.event, ability.effect.clone())
                .with_source(source)
                .with_condition(ability.condition.clone());
            self.register(trigger);
        }
        card.abilities.len()
    }

    /// Unregister a trigger.
    pub fn unregister(&mut self, id: TriggerId) -> Option<Trigger> {
        let trigger = self.triggers.remove(&id)?;
        if let Some(list) = self.by_event.get_mut(&trigger.event) {
            list.retain(|&t| t != id);
            if list.is_empty() {
                self.by_event.remove(&trigger.event);
            }
        }
        if let Some(source) = trigger.source {
            if let Some(list) = self.by_source.get_mut(&source) {
                list.retain(|&t| t != id);
                if list.is_empty() {
                    self.by_source.remove(&source);
                }
            }
        }
        Some(trigger)
    }

    /// Remove all triggers owned by a source. Returns how many were removed.
    pub fn remove_for_source(&mut self, source: PermanentId) -> usize {
        let Some(ids) = self.by_source.remove(&source) else {
            return 0;
        };
        for id in &ids {
            if let Some(trigger) = self.triggers.remove(id) {
                if let Some(list) = self.by_event.get_mut(&trigger.event) {
                    list.retain(|t| t != id);
                    if list.is_empty() {
                        self.by_event.remove(&trigger.event);
                    }
                }
            }
        }
        ids.len()
    }

    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(&id)
    }

    /// Triggers owned by a source, in registration order.
    #[must_use]
    pub fn triggers_for_source(&self, source: PermanentId) -> Vec<&Trigger> {
        self.by_source
            .get(&source)
            .into_iter()
            .flatten()
            .filter_map(|id| self.triggers.get(id))
            .collect()
    }

    /// Find the triggers that fire for an event.
    ///
    /// Every condition is evaluated against the board as it is now, before
    /// anything resolves. Results are sorted by priority (descending), then
    /// registration order.
    #[must_use]
    pub fn find_triggers(&self, event: &TriggerEvent, board: &BoardEconomy) -> Vec<TriggeredEffect> {
        let Some(ids) = self.by_event.get(&event.kind) else {
            return Vec::new();
        };

        let mut results: Vec<TriggeredEffect> = ids
            .iter()
            .filter_map(|id| self.triggers.get(id))
            .filter(|t| {
                let ctx = ConditionContext::new(event, board, t.source);
                ConditionEvaluator::evaluate(&t.condition, &ctx)
            })
            .map(|t| TriggeredEffect {
                trigger_id: t.id,
                source: t.source,
                effect: t.effect.clone(),
                priority: t.priority,
            })
            .collect();

        results.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.trigger_id.cmp(&b.trigger_id)));
        results
    }

    /// Fire an event: find the passing triggers and resolve their effects.
    ///
    /// All effects of one firing share a [`FireOutcome`].
    pub fn fire(&self, event: &TriggerEvent, board: &mut BoardEconomy) -> SimResult<FireOutcome> {
        let triggered = self.find_triggers(event, board);
        let mut outcome = FireOutcome::default();
        for t in &triggered {
            trace!("{} fires on {}", t.trigger_id, event.kind);
            let ctx = EffectContext::new(t.source, event.subject);
            EffectResolver::resolve(&t.effect, board, ctx, &mut outcome)?;
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Number of triggers listening for `kind`.
    #[must_use]
    pub fn listening(&self, kind: EventKind) -> usize {
        self.by_event.get(&kind).map_or(0, Vec::len)
    }
}
