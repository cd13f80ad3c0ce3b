use super::thresholds::ThresholdTable;
use super::{benchmark_tiers, BenchmarkTier};
use crate::utils::{days_between, hours_between, round_to, safe_ratio};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MIN_AGE_DAYS: f64 = 0.01;
const MIN_AGE_HOURS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VelocityCategory {
    Viral,
    Trending,
    Growing,
    Steady,
    Slow,
}

impl VelocityCategory {
    pub fn label(&self) -> &'static str {
        match self {
            VelocityCategory::Viral => "Viral",
            VelocityCategory::Trending => "Trending",
            VelocityCategory::Growing => "Growing",
            VelocityCategory::Steady => "Steady",
            VelocityCategory::Slow => "Slow",
        }
    }
}

/// Unscaled daily-view tiers, for content at most 3 days old
pub const VELOCITY_TIERS: ThresholdTable<VelocityCategory> = ThresholdTable::new(
    &[
        (100_000.0, VelocityCategory::Viral),
        (50_000.0, VelocityCategory::Trending),
        (10_000.0, VelocityCategory::Growing),
        (1_000.0, VelocityCategory::Steady),
    ],
    VelocityCategory::Slow,
);

/// Threshold scaling applied to videos older than `older_than_days`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeMultiplier {
    pub older_than_days: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocitySettings {
    /// Kept sorted from the oldest cut-off down
    age_multipliers: Vec<AgeMultiplier>,
}

impl Default for VelocitySettings {
    fn default() -> Self {
        Self::new(vec![
            AgeMultiplier {
                older_than_days: 7.0,
                multiplier: 0.5,
            },
            AgeMultiplier {
                older_than_days: 3.0,
                multiplier: 0.7,
            },
        ])
    }
}

impl VelocitySettings {
    pub fn new(mut age_multipliers: Vec<AgeMultiplier>) -> Self {
        age_multipliers.sort_by(|a, b| b.older_than_days.total_cmp(&a.older_than_days));
        Self { age_multipliers }
    }

    pub fn age_multipliers(&self) -> &[AgeMultiplier] {
        &self.age_multipliers
    }

    /// Multiplier of the oldest cut-off `age_days` exceeds, 1.0 if none
    pub fn multiplier_for(&self, age_days: f64) -> f64 {
        self.age_multipliers
            .iter()
            .find(|tier| age_days > tier.older_than_days)
            .map(|tier| tier.multiplier)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSample {
    pub timestamp: DateTime<Utc>,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityInput {
    pub views: u64,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub view_history: Vec<ViewSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityReport {
    pub age_days: f64,
    pub age_hours: f64,
    pub daily_velocity: f64,
    pub hourly_velocity: f64,
    /// Change in daily velocity between the last two history intervals
    pub acceleration: Option<f64>,
    pub age_multiplier: f64,
    pub category: VelocityCategory,
    pub projected_next_day: u64,
    pub projected_next_week: u64,
}

fn interval_velocity(earlier: &ViewSample, later: &ViewSample) -> f64 {
    let gained = later.views as f64 - earlier.views as f64;
    safe_ratio(gained, days_between(earlier.timestamp, later.timestamp))
}

/// Difference between the latest and the preceding interval velocity.
/// Needs at least three samples.
pub fn acceleration(history: &[ViewSample]) -> Option<f64> {
    let [.., before_previous, previous, latest] = history else {
        return None;
    };

    let recent = interval_velocity(previous, latest);
    let past = interval_velocity(before_previous, previous);
    Some(recent - past)
}

pub fn calculate_velocity(
    views: u64,
    published_at: DateTime<Utc>,
    history: &[ViewSample],
    now: DateTime<Utc>,
    settings: &VelocitySettings,
) -> VelocityReport {
    let age_days = days_between(published_at, now).max(MIN_AGE_DAYS);
    let age_hours = hours_between(published_at, now).max(MIN_AGE_HOURS);

    let daily_velocity = safe_ratio(views as f64, age_days).round();
    let hourly_velocity = safe_ratio(views as f64, age_hours).round();
    let age_multiplier = settings.multiplier_for(age_days);

    VelocityReport {
        age_days: round_to(age_days, 2),
        age_hours: round_to(age_hours, 1),
        daily_velocity,
        hourly_velocity,
        acceleration: acceleration(history).map(f64::round),
        age_multiplier,
        category: VELOCITY_TIERS.classify_scaled(daily_velocity, age_multiplier),
        projected_next_day: daily_velocity as u64,
        projected_next_week: (daily_velocity * 7.0) as u64,
    }
}

pub fn calculate_velocity_report(
    input: &VelocityInput,
    now: DateTime<Utc>,
    settings: &VelocitySettings,
) -> VelocityReport {
    calculate_velocity(
        input.views,
        input.published_at,
        &input.view_history,
        now,
        settings,
    )
}

/// Tiers as they apply to a video of `age_days`
pub fn benchmarks(age_days: f64, settings: &VelocitySettings) -> Vec<BenchmarkTier> {
    benchmark_tiers(&VELOCITY_TIERS, settings.multiplier_for(age_days), |category| {
        category.label()
    })
}
