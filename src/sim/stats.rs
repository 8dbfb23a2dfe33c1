//! Summary statistics and the validity verdict.

use serde::{Deserialize, Serialize};

use crate::core::ValidityThresholds;

/// Distribution summary of one sample.
///
/// Percentiles use the nearest-rank method, so every reported value is an
/// observed one and `min <= p10 <= ... <= p90 <= max` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Zero below two values.
    pub stdev: f64,
    pub min: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Summarize `values`. An empty sample gives all zeros.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let stdev = if n < 2 {
            0.0
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };

        Self {
            count: n,
            mean,
            stdev,
            min: sorted[0],
            p10: nearest_rank(&sorted, 10.0),
            p25: nearest_rank(&sorted, 25.0),
            p50: nearest_rank(&sorted, 50.0),
            p75: nearest_rank(&sorted, 75.0),
            p90: nearest_rank(&sorted, 90.0),
            max: sorted[n - 1],
        }
    }

    /// Coefficient of variation. Zero for a constant sample, infinite for a
    /// zero mean with spread.
    #[must_use]
    pub fn cv(&self) -> f64 {
        if self.stdev == 0.0 {
            0.0
        } else if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.stdev / self.mean.abs()
        }
    }

    /// Relative standard error of the mean, `cv / sqrt(n)`.
    #[must_use]
    pub fn relative_standard_error(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        self.cv() / (self.count as f64).sqrt()
    }

    /// The percentile bands in ascending order.
    #[must_use]
    pub fn bands(&self) -> [f64; 7] {
        [self.min, self.p10, self.p25, self.p50, self.p75, self.p90, self.max]
    }
}

/// Value at percentile `p` of a sorted, non-empty sample.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

/// Whether a run's trial count supports its numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Reliable,
    Marginal,
    IncreaseTrials { recommended: usize },
}

impl Verdict {
    /// Judge the primary outcome sample.
    ///
    /// The recommendation scales the observed variance to the target
    /// confidence half-width: `ceil((z * cv / target)^2)`.
    #[must_use]
    pub fn judge(primary: &SummaryStats, thresholds: &ValidityThresholds) -> Self {
        if primary.count == 0 {
            return Verdict::Marginal;
        }
        if primary.stdev == 0.0 {
            return Verdict::Reliable;
        }
        let rse = primary.relative_standard_error();
        if rse <= thresholds.reliable_below {
            Verdict::Reliable
        } else if rse > thresholds.increase_above {
            let needed = (thresholds.z * primary.cv() / thresholds.target_relative_half_width).powi(2);
            Verdict::IncreaseTrials {
                recommended: needed.ceil() as usize,
            }
        } else {
            Verdict::Marginal
        }
    }

    #[must_use]
    pub fn is_reliable(self) -> bool {
        self == Verdict::Reliable
    }

    /// Trials to run next time, if more are needed.
    #[must_use]
    pub fn recommended(self) -> Option<usize> {
        match self {
            Verdict::IncreaseTrials { recommended } => Some(recommended),
            Verdict::Reliable | Verdict::Marginal => None,
        }
    }
}
