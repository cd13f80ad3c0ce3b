use super::thresholds::ThresholdTable;
use super::{benchmark_tiers, BenchmarkTier};
use crate::utils::{format_timestamp, percentage, round_to};
use serde::{Deserialize, Serialize};

const LOW_RETENTION_TIP_BELOW: f64 = 30.0;
const WEAK_OPENING_TIP_BELOW: f64 = 80.0;
const PACING_TIP_ABOVE_DROPS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RetentionCategory {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Work")]
    NeedsWork,
}

impl RetentionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RetentionCategory::Excellent => "Excellent",
            RetentionCategory::Good => "Good",
            RetentionCategory::Average => "Average",
            RetentionCategory::NeedsWork => "Needs Work",
        }
    }
}

const TUTORIAL_TIERS: ThresholdTable<RetentionCategory> = ThresholdTable::new(
    &[
        (50.0, RetentionCategory::Excellent),
        (35.0, RetentionCategory::Good),
        (25.0, RetentionCategory::Average),
    ],
    RetentionCategory::NeedsWork,
);

const ENTERTAINMENT_TIERS: ThresholdTable<RetentionCategory> = ThresholdTable::new(
    &[
        (45.0, RetentionCategory::Excellent),
        (30.0, RetentionCategory::Good),
        (20.0, RetentionCategory::Average),
    ],
    RetentionCategory::NeedsWork,
);

const REVIEW_TIERS: ThresholdTable<RetentionCategory> = ThresholdTable::new(
    &[
        (40.0, RetentionCategory::Excellent),
        (28.0, RetentionCategory::Good),
        (18.0, RetentionCategory::Average),
    ],
    RetentionCategory::NeedsWork,
);

const DEFAULT_TIERS: ThresholdTable<RetentionCategory> = ENTERTAINMENT_TIERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Tutorial,
    Entertainment,
    Review,
    #[default]
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Unknown keys are `Other`
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "tutorial" => ContentType::Tutorial,
            "entertainment" => ContentType::Entertainment,
            "review" => ContentType::Review,
            _ => ContentType::Other,
        }
    }

    pub fn tiers(&self) -> &'static ThresholdTable<RetentionCategory> {
        match self {
            ContentType::Tutorial => &TUTORIAL_TIERS,
            ContentType::Entertainment => &ENTERTAINMENT_TIERS,
            ContentType::Review => &REVIEW_TIERS,
            ContentType::Other => &DEFAULT_TIERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSettings {
    /// Playback position (seconds) at which early retention is read
    pub early_mark_seconds: f64,
    /// Early retention reported when no sample reaches the mark
    pub early_default: f64,
    /// A drop between consecutive samples must exceed this many points
    pub critical_drop_threshold: f64,
    pub max_critical_drops: usize,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            early_mark_seconds: 30.0,
            early_default: 100.0,
            critical_drop_threshold: 10.0,
            max_critical_drops: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionPoint {
    /// Seconds into the video
    pub timestamp: f64,
    /// Percentage of viewers still watching
    pub retention: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionInput {
    /// Seconds
    pub duration: f64,
    pub views: u64,
    pub average_view_duration: f64,
    pub total_watch_time: f64,
    #[serde(default)]
    pub retention_points: Vec<RetentionPoint>,
    #[serde(default)]
    pub content_type: ContentType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalDrop {
    pub timestamp: f64,
    pub at: String,
    pub drop: f64,
    pub retention: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionReport {
    pub avg_retention_rate: f64,
    pub total_retention_rate: f64,
    pub category: RetentionCategory,
    pub content_type: ContentType,
    pub early_retention: f64,
    pub critical_drops: Vec<CriticalDrop>,
    pub watch_hours: u64,
    pub tips: Vec<&'static str>,
}

fn chronological(points: &[RetentionPoint]) -> Vec<RetentionPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    sorted
}

/// Consecutive-sample drops larger than the threshold, earliest first,
/// capped at `max_critical_drops`.
pub fn find_critical_drops(points: &[RetentionPoint], settings: &RetentionSettings) -> Vec<CriticalDrop> {
    chronological(points)
        .windows(2)
        .filter_map(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            let drop = previous.retention - current.retention;
            (drop > settings.critical_drop_threshold).then(|| CriticalDrop {
                timestamp: current.timestamp,
                at: format_timestamp(current.timestamp),
                drop,
                retention: current.retention,
            })
        })
        .take(settings.max_critical_drops)
        .collect()
}

/// Retention at the first sample on or after the early mark
pub fn early_retention(points: &[RetentionPoint], settings: &RetentionSettings) -> f64 {
    chronological(points)
        .iter()
        .find(|point| point.timestamp >= settings.early_mark_seconds)
        .map(|point| point.retention)
        .unwrap_or(settings.early_default)
}

fn improvement_tips(avg_rate: f64, early: f64, drops: usize) -> Vec<&'static str> {
    let mut tips = Vec::new();
    if avg_rate < LOW_RETENTION_TIP_BELOW {
        tips.push("Hook viewers in first 15 seconds");
    }
    if early < WEAK_OPENING_TIP_BELOW {
        tips.push("Improve your video opening");
    }
    if drops > PACING_TIP_ABOVE_DROPS {
        tips.push("Review content pacing at drop points");
    }
    tips.push("Add pattern interrupts every 2-3 minutes");
    tips
}

pub fn calculate_retention(input: &RetentionInput, settings: &RetentionSettings) -> RetentionReport {
    let avg_retention_rate = round_to(percentage(input.average_view_duration, input.duration), 1);
    let total_retention_rate = round_to(
        percentage(input.total_watch_time, input.views as f64 * input.duration),
        1,
    );

    let critical_drops = find_critical_drops(&input.retention_points, settings);
    let early = early_retention(&input.retention_points, settings);

    RetentionReport {
        avg_retention_rate,
        total_retention_rate,
        category: input.content_type.tiers().classify(avg_retention_rate),
        content_type: input.content_type,
        early_retention: early,
        tips: improvement_tips(avg_retention_rate, early, critical_drops.len()),
        critical_drops,
        watch_hours: (input.total_watch_time.max(0.0) / 3600.0).round() as u64,
    }
}

pub fn benchmarks(content_type: ContentType) -> Vec<BenchmarkTier> {
    benchmark_tiers(content_type.tiers(), 1.0, |category| category.label())
}
