//! Per-trial measurements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::zones::BoardEconomy;

/// A per-turn series recorded for every trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LandsInPlay,
    /// Mana the board produces per turn.
    ManaAvailable,
    CardsPlayed,
    CombatDamage,
    CumulativeDamage,
    /// Our life minus starting life.
    LifeDelta,
    /// Tokens created so far.
    TokensCreated,
    HandSize,
    CreaturesInPlay,
    /// Fraction of the deck's colors the board can produce.
    ColorCoverage,
    /// Lands played through the land drop so far.
    LandDrops,
    /// Lands put onto the battlefield by spells so far.
    RampLands,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::LandsInPlay,
        Metric::ManaAvailable,
        Metric::CardsPlayed,
        Metric::CombatDamage,
        Metric::CumulativeDamage,
        Metric::LifeDelta,
        Metric::TokensCreated,
        Metric::HandSize,
        Metric::CreaturesInPlay,
        Metric::ColorCoverage,
        Metric::LandDrops,
        Metric::RampLands,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Metric::LandsInPlay => "lands_in_play",
            Metric::ManaAvailable => "mana_available",
            Metric::CardsPlayed => "cards_played",
            Metric::CombatDamage => "combat_damage",
            Metric::CumulativeDamage => "cumulative_damage",
            Metric::LifeDelta => "life_delta",
            Metric::TokensCreated => "tokens_created",
            Metric::HandSize => "hand_size",
            Metric::CreaturesInPlay => "creatures_in_play",
            Metric::ColorCoverage => "color_coverage",
            Metric::LandDrops => "land_drops",
            Metric::RampLands => "ramp_lands",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything one trial measured. Series are indexed by turn - 1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    pub seed: u64,
    series: BTreeMap<Metric, Vec<f64>>,
    pub total_damage: i64,
    /// First turn the opponent was at 0 life or below.
    pub win_turn: Option<u32>,
    /// First turn the marquee was cast.
    pub marquee_turn: Option<u32>,
    pub land_drops: u32,
    pub ramp_lands: u32,
    pub tokens_created: u32,
    pub tokens_destroyed: u32,
    pub mulligans: u32,
}

impl TrialMetrics {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Append one value to a series.
    pub fn record(&mut self, metric: Metric, value: f64) {
        self.series.entry(metric).or_default().push(value);
    }

    /// Record every metric for the turn that just ended.
    pub fn snapshot(&mut self, board: &BoardEconomy, combat_damage: i64, starting_life: i64) {
        let counters = board.counters();
        let identity = board.deck().color_identity();
        let wanted = identity.colors().count();
        let coverage = if wanted == 0 {
            1.0
        } else {
            let in_play = board.colors_in_play();
            let covered = identity.colors().filter(|&c| in_play.satisfies(c)).count();
            covered as f64 / wanted as f64
        };

        self.record(Metric::LandsInPlay, board.lands_in_play() as f64);
        self.record(Metric::ManaAvailable, f64::from(board.mana_potential()));
        self.record(Metric::CardsPlayed, f64::from(counters.cards_played_this_turn));
        self.record(Metric::CombatDamage, combat_damage as f64);
        self.record(Metric::CumulativeDamage, counters.damage_total as f64);
        self.record(Metric::LifeDelta, (counters.life - starting_life) as f64);
        self.record(Metric::TokensCreated, f64::from(counters.tokens_created));
        self.record(Metric::HandSize, board.hand().len() as f64);
        self.record(Metric::CreaturesInPlay, board.creature_count() as f64);
        self.record(Metric::ColorCoverage, coverage);
        self.record(Metric::LandDrops, f64::from(counters.land_drops));
        self.record(Metric::RampLands, f64::from(counters.ramp_lands));
    }

    /// Copy the end-of-trial scalars off the board.
    pub fn finish(&mut self, board: &BoardEconomy) {
        let counters = board.counters();
        self.total_damage = counters.damage_total;
        self.land_drops = counters.land_drops;
        self.ramp_lands = counters.ramp_lands;
        self.tokens_created = counters.tokens_created;
        self.tokens_destroyed = counters.tokens_destroyed;
        self.mulligans = counters.mulligans;
    }

    /// Note the marquee resolving on `turn`; only the first cast counts.
    pub fn mark_marquee(&mut self, turn: u32) {
        self.marquee_turn.get_or_insert(turn);
    }

    /// Note the opponent being dead on `turn`; only the first turn counts.
    pub fn mark_win(&mut self, turn: u32) {
        self.win_turn.get_or_insert(turn);
    }

    #[must_use]
    pub fn series(&self, metric: Metric) -> &[f64] {
        self.series.get(&metric).map_or(&[], Vec::as_slice)
    }

    /// Value of `metric` at the end of `turn` (1-based).
    #[must_use]
    pub fn at(&self, metric: Metric, turn: u32) -> Option<f64> {
        let index = usize::try_from(turn).ok()?.checked_sub(1)?;
        self.series(metric).get(index).copied()
    }

    /// Turns recorded.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.series.values().map(Vec::len).max().unwrap_or(0)
    }
}
