//! Effect resolution: applying effects to a board.
//!
//! `EffectResolver` is the only interpreter of [`Effect`]. Effects resolved
//! together (one trigger firing, or one spell) share a [`FireOutcome`] so
//! doublers can repeat what was produced before them.

use log::trace;
use serde::{Deserialize, Serialize};

use super::effect::{CounterKind, DoubleKind, Effect};
use super::targeting::EffectTarget;
use crate::cards::TokenTemplate;
use crate::core::{PermanentId, SimResult};
use crate::zones::BoardEconomy;

/// Objects an effect can refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectContext {
    /// The permanent whose ability is resolving.
    pub source: Option<PermanentId>,
    /// The permanent the triggering event is about.
    pub subject: Option<PermanentId>,
}

impl EffectContext {
    #[must_use]
    pub fn new(source: Option<PermanentId>, subject: Option<PermanentId>) -> Self {
        Self { source, subject }
    }
}

/// What one group of effects produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireOutcome {
    pub tokens: Vec<(TokenTemplate, u32)>,
    pub counters: Vec<(PermanentId, CounterKind, i32)>,
    /// Damage dealt to the opponent.
    pub damage: i64,
    pub cards_drawn: usize,
    pub mana_added: u32,
}

impl FireOutcome {
    /// Tokens created, counting duplicates.
    #[must_use]
    pub fn token_count(&self) -> u32 {
        self.tokens.iter().map(|(_, n)| n).sum()
    }
}

/// Applies effects to a board.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve a group of effects in priority order, ties in list order.
    pub fn resolve_all(
        effects: &[Effect],
        board: &mut BoardEconomy,
        ctx: EffectContext,
    ) -> SimResult<FireOutcome> {
        let mut ordered: Vec<&Effect> = effects.iter().collect();
        ordered.sort_by_key(|e| std::cmp::Reverse(e.category().priority()));

        let mut outcome = FireOutcome::default();
        for effect in ordered {
            Self::resolve(effect, board, ctx, &mut outcome)?;
        }
        Ok(outcome)
    }

    /// Resolve one effect.
    ///
    /// Only card draw can fail, when it draws a malformed card.
    pub fn resolve(
        effect: &Effect,
        board: &mut BoardEconomy,
        ctx: EffectContext,
        outcome: &mut FireOutcome,
    ) -> SimResult<()> {
        trace!("resolve {effect:?}");
        match effect {
            Effect::DealDamage { amount, target } => {
                match target {
                    EffectTarget::Opponent => outcome.damage += board.damage_opponent(i64::from(*amount)),
                    EffectTarget::Controller => board.lose_life(i64::from(*amount)),
                    _ => {
                        for id in target.permanents(board, ctx.source, ctx.subject) {
                            let lethal = board
                                .permanent(id)
                                .is_some_and(|p| p.is_creature() && *amount >= p.card.toughness + p.plus_counters);
                            if lethal {
                                board.move_to_graveyard(id);
                            }
                        }
                    }
                }
            }

            Effect::GainLife { amount } => board.gain_life(i64::from(*amount)),

            Effect::LoseLife { amount } => board.lose_life(i64::from(*amount)),

            Effect::CreateToken { template, count } => {
                Self::make_tokens(board, template, *count, outcome);
            }

            Effect::DrawCards { n } => {
                outcome.cards_drawn += board.draw(*n as usize)?;
            }

            Effect::GrantCounter { counter, amount, target } => {
                for id in target.permanents(board, ctx.source, ctx.subject) {
                    Self::place_counters(board, id, *counter, *amount, outcome);
                }
            }

            Effect::AddMana { color, amount } => {
                board.add_mana(*color, *amount);
                outcome.mana_added += u32::from(*amount);
            }

            Effect::PumpCreatures { amount } => board.pump_creatures(*amount),

            Effect::Sacrifice { target } => {
                for id in target.permanents(board, ctx.source, ctx.subject) {
                    board.move_to_graveyard(id);
                }
            }

            Effect::Double { of } => match of {
                DoubleKind::Tokens => {
                    for (token, count) in outcome.tokens.clone() {
                        Self::make_tokens(board, &token, count, outcome);
                    }
                }
                DoubleKind::Counters => {
                    for (id, counter, amount) in outcome.counters.clone() {
                        Self::place_counters(board, id, counter, amount, outcome);
                    }
                }
                DoubleKind::Damage => {
                    let extra = outcome.damage;
                    outcome.damage += board.damage_opponent(extra);
                }
            },
        }
        Ok(())
    }

    fn make_tokens(board: &mut BoardEconomy, token: &TokenTemplate, count: u32, outcome: &mut FireOutcome) {
        if count == 0 {
            return;
        }
        board.create_token(token, count);
        outcome.tokens.push((token.clone(), count));
    }

    fn place_counters(
        board: &mut BoardEconomy,
        id: PermanentId,
        counter: CounterKind,
        amount: i32,
        outcome: &mut FireOutcome,
    ) {
        let placed = match counter {
            CounterKind::PlusOne => board.add_plus_counters(id, amount),
            CounterKind::Loyalty => board.add_loyalty(id, amount),
        };
        if placed {
            outcome.counters.push((id, counter, amount));
        }
    }
}
