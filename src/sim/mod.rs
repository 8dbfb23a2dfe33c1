//! Monte Carlo driver and its statistics.
//!
//! ## Key Components
//!
//! - [`MonteCarloDriver`]: runs trials in parallel batches
//! - [`TrialMetrics`]: what one trial measured, per turn and overall
//! - [`SummaryStats`]: mean, spread and percentile bands of a sample
//! - [`AggregateReport`]: the reduced run with its [`Verdict`]

mod driver;
mod metrics;
mod report;
mod stats;

pub use driver::{simulate, CancelToken, MonteCarloDriver};
pub use metrics::{Metric, TrialMetrics};
pub use report::AggregateReport;
pub use stats::{SummaryStats, Verdict};
