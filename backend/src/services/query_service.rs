use crate::models::VideoRecord;
use crate::services::aggregation_service::{aggregate, AggregateStats};
use crate::utils::hours_between;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Category filter value that disables category filtering
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[default]
    #[serde(rename = "all")]
    AllTime,
}

impl TimeWindow {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "24h" => Some(TimeWindow::Last24Hours),
            "7d" => Some(TimeWindow::Last7Days),
            "30d" => Some(TimeWindow::Last30Days),
            "all" => Some(TimeWindow::AllTime),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TimeWindow::Last24Hours => "24h",
            TimeWindow::Last7Days => "7d",
            TimeWindow::Last30Days => "30d",
            TimeWindow::AllTime => "all",
        }
    }

    /// Largest accepted age in hours, `None` for an unbounded window
    pub fn max_age_hours(&self) -> Option<f64> {
        match self {
            TimeWindow::Last24Hours => Some(24.0),
            TimeWindow::Last7Days => Some(7.0 * 24.0),
            TimeWindow::Last30Days => Some(30.0 * 24.0),
            TimeWindow::AllTime => None,
        }
    }

    /// Whether the video's age at `now` falls inside the window (inclusive bound).
    /// Videos without a readable publish time only pass the unbounded window.
    pub fn contains(&self, video: &VideoRecord, now: DateTime<Utc>) -> bool {
        let Some(max_age) = self.max_age_hours() else {
            return true;
        };

        match video.published() {
            Some(published) => hours_between(published, now) <= max_age,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Views,
    Likes,
    Comments,
    Recent,
}

impl SortKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "views" => Some(SortKey::Views),
            "likes" => Some(SortKey::Likes),
            "comments" => Some(SortKey::Comments),
            "recent" => Some(SortKey::Recent),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SortKey::Views => "views",
            SortKey::Likes => "likes",
            SortKey::Comments => "comments",
            SortKey::Recent => "recent",
        }
    }
}

/// Filter and sort selection for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub category_filter: String,
    pub time_window: TimeWindow,
    pub search_text: String,
    pub sort_key: SortKey,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category_filter: ALL_CATEGORIES.to_string(),
            time_window: TimeWindow::AllTime,
            search_text: String::new(),
            sort_key: SortKey::Views,
        }
    }
}

impl FilterConfig {
    /// Build a config from raw request parameters; missing or unknown values
    /// fall back to the defaults.
    pub fn from_params(
        category: Option<String>,
        time: Option<&str>,
        search: Option<String>,
        sort: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            category_filter: category
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.category_filter),
            time_window: time
                .and_then(TimeWindow::from_key)
                .unwrap_or(defaults.time_window),
            search_text: search.unwrap_or(defaults.search_text),
            sort_key: sort.and_then(SortKey::from_key).unwrap_or(defaults.sort_key),
        }
    }

    /// Number of settings that differ from the defaults
    pub fn active_filter_count(&self) -> usize {
        [
            self.category_filter != ALL_CATEGORIES,
            self.time_window != TimeWindow::AllTime,
            !self.search_text.trim().is_empty(),
            self.sort_key != SortKey::Views,
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    pub id: String,
    pub name: &'static str,
}

#[derive(Debug)]
pub struct QueryResult<'a> {
    pub videos: Vec<&'a VideoRecord>,
    pub stats: AggregateStats,
}

fn matches_category(video: &VideoRecord, category_filter: &str) -> bool {
    category_filter == ALL_CATEGORIES || video.category_id == category_filter
}

/// Lower-cased search text, empty when the search is blank. Only blankness is
/// decided on the trimmed text; surrounding spaces still take part in matching.
fn search_needle(search_text: &str) -> String {
    if search_text.trim().is_empty() {
        return String::new();
    }
    search_text.to_lowercase()
}

fn matches_search(video: &VideoRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    video.title.to_lowercase().contains(needle)
        || video.channel_title.to_lowercase().contains(needle)
        || video.category_name().to_lowercase().contains(needle)
}

/// Apply the category, time and search predicates, keeping input order.
pub fn filter_videos<'a>(
    videos: &'a [VideoRecord],
    config: &FilterConfig,
    now: DateTime<Utc>,
) -> Vec<&'a VideoRecord> {
    let needle = search_needle(&config.search_text);

    videos
        .iter()
        .filter(|video| matches_category(video, &config.category_filter))
        .filter(|video| config.time_window.contains(video, now))
        .filter(|video| matches_search(video, &needle))
        .collect()
}

/// Stable descending sort; equal keys keep their relative order.
pub fn sort_videos(videos: &mut [&VideoRecord], sort_key: SortKey) {
    match sort_key {
        SortKey::Views => videos.sort_by(|a, b| b.views().cmp(&a.views())),
        SortKey::Likes => videos.sort_by(|a, b| b.likes().cmp(&a.likes())),
        SortKey::Comments => videos.sort_by(|a, b| b.comments().cmp(&a.comments())),
        // Unreadable timestamps are `None` and therefore sort last
        SortKey::Recent => videos.sort_by(|a, b| b.published().cmp(&a.published())),
    }
}

/// Filter, sort and aggregate `videos` for one configuration.
///
/// `now` is the single reference time for every age computation in this run.
pub fn run_query<'a>(
    videos: &'a [VideoRecord],
    config: &FilterConfig,
    now: DateTime<Utc>,
) -> QueryResult<'a> {
    let mut filtered = filter_videos(videos, config, now);
    sort_videos(&mut filtered, config.sort_key);
    let stats = aggregate(&filtered, now);

    debug!(
        "Query kept {} of {} videos (category={}, time={}, sort={})",
        filtered.len(),
        videos.len(),
        config.category_filter,
        config.time_window.key(),
        config.sort_key.key()
    );

    QueryResult {
        videos: filtered,
        stats,
    }
}

/// Distinct categories present in `videos`, sorted by display name
pub fn available_categories(videos: &[VideoRecord]) -> Vec<CategoryOption> {
    let mut seen = HashSet::new();
    let mut categories: Vec<CategoryOption> = videos
        .iter()
        .filter(|video| seen.insert(video.category_id.as_str()))
        .map(|video| CategoryOption {
            id: video.category_id.clone(),
            name: video.category_name(),
        })
        .collect();

    categories.sort_by(|a, b| a.name.cmp(b.name));
    categories
}

/// The `count` most recently published videos
pub fn most_recent<'a>(videos: &[&'a VideoRecord], count: usize) -> Vec<&'a VideoRecord> {
    let mut recent = videos.to_vec();
    sort_videos(&mut recent, SortKey::Recent);
    recent.truncate(count);
    recent
}
