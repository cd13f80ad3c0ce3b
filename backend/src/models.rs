use crate::services::aggregation_service::{AggregateStats, CategoryStats, TimeBreakdown};
use crate::services::catalog::category_name;
use crate::services::metrics::engagement::{calculate_engagement, EngagementReport};
use crate::services::metrics::velocity::{calculate_velocity, VelocityReport};
use crate::services::metrics::MetricSettings;
use crate::services::query_service::CategoryOption;
use crate::utils::{format_number, format_time_ago, parse_count, parse_iso8601_to_datetime};
use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::{response, Response};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

fn zero_count() -> String {
    "0".to_string()
}

/// A trending video as delivered by the data source.
///
/// Counters stay in their wire form (numeric strings) and are parsed on use, and
/// the category display name is never stored: see [`VideoRecord::category_name`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default = "zero_count")]
    pub view_count: String,
    #[serde(default = "zero_count")]
    pub like_count: String,
    #[serde(default = "zero_count")]
    pub comment_count: String,
    pub published_at: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub video_url: String,
}

impl VideoRecord {
    pub fn views(&self) -> u64 {
        parse_count(&self.view_count)
    }

    pub fn likes(&self) -> u64 {
        parse_count(&self.like_count)
    }

    pub fn comments(&self) -> u64 {
        parse_count(&self.comment_count)
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_iso8601_to_datetime(&self.published_at)
    }

    pub fn category_name(&self) -> &'static str {
        category_name(&self.category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub videos: Vec<VideoRecord>,
    pub region_code: String,
    pub total_results: u64,
}

/// A video as shown on a card: the record plus everything derived from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub video: VideoRecord,
    pub category_name: &'static str,
    pub views_formatted: String,
    pub likes_formatted: String,
    pub comments_formatted: String,
    pub published_ago: Option<String>,
    pub engagement: EngagementReport,
    pub velocity: Option<VelocityReport>,
}

impl VideoEntry {
    pub fn new(
        rank: usize,
        video: &VideoRecord,
        now: DateTime<Utc>,
        settings: &MetricSettings,
    ) -> Self {
        let published = video.published();
        Self {
            rank,
            video: video.clone(),
            category_name: video.category_name(),
            views_formatted: format_number(video.views()),
            likes_formatted: format_number(video.likes()),
            comments_formatted: format_number(video.comments()),
            published_ago: published.map(|at| format_time_ago(at, now)),
            engagement: calculate_engagement(&video.into()),
            velocity: published.map(|published_at| {
                calculate_velocity(
                    video.views(),
                    published_at,
                    &[],
                    now,
                    &settings.velocity,
                )
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub region_code: String,
    pub total_results: u64,
    pub fetched_count: usize,
    pub filtered_count: usize,
    pub active_filters: usize,
    pub videos: Vec<VideoEntry>,
    pub stats: AggregateStats,
    pub available_categories: Vec<CategoryOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysisResponse {
    pub region_code: String,
    pub filtered_count: usize,
    pub categories: Vec<CategoryStats>,
    pub top_category: Option<CategoryStats>,
    /// Highest views per video
    pub most_viral: Option<CategoryStats>,
    pub avg_views_per_category: u64,
    pub available_categories: Vec<CategoryOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysisResponse {
    pub region_code: String,
    pub filtered_count: usize,
    pub time: TimeBreakdown,
    pub best_hour: Option<String>,
    pub best_day: Option<String>,
    pub most_recent: Vec<VideoRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: Status,
}

impl ErrorResponse {
    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status: Status::BadRequest,
        }
    }

    pub fn bad_gateway(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status: Status::BadGateway,
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
