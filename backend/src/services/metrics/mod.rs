//! Per-video metric calculators.
//!
//! Every calculator is a pure function of its input (and, where ages are
//! involved, an explicit `now`). Ratios with a zero denominator resolve to 0 or
//! to the documented floor so reports always serialize to finite numbers.

pub mod conversion;
pub mod engagement;
pub mod retention;
pub mod thresholds;
pub mod velocity;

use retention::RetentionSettings;
use serde::Serialize;
use velocity::VelocitySettings;

/// Tunable heuristics used by the calculators
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSettings {
    pub velocity: VelocitySettings,
    pub retention: RetentionSettings,
}

/// One row of a benchmark table as shown next to a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkTier {
    pub min: Option<f64>,
    pub label: &'static str,
}

pub(crate) fn benchmark_tiers<L: Copy + 'static>(
    table: &thresholds::ThresholdTable<L>,
    scale: f64,
    label: impl Fn(L) -> &'static str,
) -> Vec<BenchmarkTier> {
    table
        .tiers()
        .iter()
        .map(|(bound, tier)| BenchmarkTier {
            min: Some(bound * scale),
            label: label(*tier),
        })
        .chain(std::iter::once(BenchmarkTier {
            min: None,
            label: label(table.fallback()),
        }))
        .collect()
}
