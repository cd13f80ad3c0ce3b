use super::thresholds::ThresholdTable;
use super::{benchmark_tiers, BenchmarkTier};
use crate::models::VideoRecord;
use crate::utils::{percentage, round_to, safe_ratio};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngagementCategory {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl EngagementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            EngagementCategory::Excellent => "Excellent",
            EngagementCategory::VeryGood => "Very Good",
            EngagementCategory::Good => "Good",
            EngagementCategory::BelowAverage => "Below Average",
        }
    }
}

/// Engagement rate tiers, in percent of views
pub const ENGAGEMENT_TIERS: ThresholdTable<EngagementCategory> = ThresholdTable::new(
    &[
        (5.0, EngagementCategory::Excellent),
        (3.0, EngagementCategory::VeryGood),
        (1.0, EngagementCategory::Good),
    ],
    EngagementCategory::BelowAverage,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementInput {
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
}

impl From<&VideoRecord> for EngagementInput {
    fn from(video: &VideoRecord) -> Self {
        Self {
            views: video.views(),
            likes: video.likes(),
            comments: video.comments(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementReport {
    /// (likes + comments) as a percentage of views, 2 decimals
    pub rate: f64,
    pub category: EngagementCategory,
    pub like_rate: f64,
    pub comment_rate: f64,
    pub comments_per_like: f64,
}

pub fn engagement_rate(views: u64, likes: u64, comments: u64) -> f64 {
    let interactions = likes.saturating_add(comments) as f64;
    round_to(percentage(interactions, views as f64), 2)
}

pub fn calculate_engagement(input: &EngagementInput) -> EngagementReport {
    let views = input.views as f64;
    let rate = engagement_rate(input.views, input.likes, input.comments);

    EngagementReport {
        rate,
        category: ENGAGEMENT_TIERS.classify(rate),
        like_rate: round_to(percentage(input.likes as f64, views), 2),
        comment_rate: round_to(percentage(input.comments as f64, views), 2),
        comments_per_like: round_to(safe_ratio(input.comments as f64, input.likes as f64), 2),
    }
}

pub fn benchmarks() -> Vec<BenchmarkTier> {
    benchmark_tiers(&ENGAGEMENT_TIERS, 1.0, |category| category.label())
}
