use crate::models::VideoRecord;
use crate::services::catalog::region_name;
use crate::utils::{average_floored, average_rounded, hours_between};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Upper bounds (inclusive, in hours) of the content age buckets; anything
/// older falls into the last bucket.
const AGE_BUCKETS: [(f64, &str); 5] = [
    (1.0, "0-1 hours"),
    (6.0, "1-6 hours"),
    (24.0, "6-24 hours"),
    (168.0, "1-7 days"),
    (672.0, "1-4 weeks"),
];
const OLDEST_AGE_BUCKET: &str = "1+ months";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_id: String,
    pub category_name: &'static str,
    pub video_count: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub avg_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucketStats {
    pub label: String,
    pub video_count: usize,
    pub total_views: u64,
    pub avg_views: u64,
}

impl TimeBucketStats {
    fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            video_count: 0,
            total_views: 0,
            avg_views: 0,
        }
    }

    fn add(&mut self, views: u64) {
        self.video_count += 1;
        self.total_views = self.total_views.saturating_add(views);
    }

    fn finish(&mut self) {
        self.avg_views = average_rounded(self.total_views, self.video_count);
    }
}

/// Publish-time distribution. Hours, weekdays and months are taken in UTC.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBreakdown {
    pub hourly: Vec<TimeBucketStats>,
    pub daily: Vec<TimeBucketStats>,
    pub monthly: Vec<TimeBucketStats>,
    pub by_age: Vec<TimeBucketStats>,
}

impl TimeBreakdown {
    /// Hour bucket with the highest average views; the earliest wins ties
    pub fn best_hour(&self) -> Option<&TimeBucketStats> {
        best_bucket(&self.hourly)
    }

    /// Weekday bucket with the highest average views; the earliest wins ties
    pub fn best_day(&self) -> Option<&TimeBucketStats> {
        best_bucket(&self.daily)
    }
}

fn best_bucket(buckets: &[TimeBucketStats]) -> Option<&TimeBucketStats> {
    buckets.iter().fold(None, |best, bucket| match best {
        Some(current) if current.avg_views >= bucket.avg_views => Some(current),
        _ => Some(bucket),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_views: u64,
    /// Videos published within the last 24 hours
    pub recent_videos: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub categories: Vec<CategoryStats>,
    pub time: TimeBreakdown,
    pub overview: OverviewStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub region_code: String,
    pub region_name: String,
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub avg_views: u64,
}

/// Full recomputation of every statistic over `videos`.
pub fn aggregate(videos: &[&VideoRecord], now: DateTime<Utc>) -> AggregateStats {
    AggregateStats {
        categories: category_breakdown(videos),
        time: time_breakdown(videos, now),
        overview: overview(videos, now),
    }
}

/// Per-category totals, largest categories first. Categories with the same
/// count keep the order in which they first appear in `videos`.
///
/// Rows are grouped by display name, so all unknown ids share one `"Unknown"`
/// row carrying the first id seen.
pub fn category_breakdown(videos: &[&VideoRecord]) -> Vec<CategoryStats> {
    let mut positions: HashMap<&'static str, usize> = HashMap::new();
    let mut categories: Vec<CategoryStats> = Vec::new();

    for video in videos {
        let index = *positions
            .entry(video.category_name())
            .or_insert_with(|| {
                categories.push(CategoryStats {
                    category_id: video.category_id.clone(),
                    category_name: video.category_name(),
                    video_count: 0,
                    total_views: 0,
                    total_likes: 0,
                    avg_views: 0,
                });
                categories.len() - 1
            });

        let stats = &mut categories[index];
        stats.video_count += 1;
        stats.total_views = stats.total_views.saturating_add(video.views());
        stats.total_likes = stats.total_likes.saturating_add(video.likes());
    }

    for stats in categories.iter_mut() {
        stats.avg_views = average_rounded(stats.total_views, stats.video_count);
    }

    categories.sort_by(|a, b| b.video_count.cmp(&a.video_count));
    categories
}

/// Category with the highest views per video; the earliest wins ties
pub fn most_viral_category(categories: &[CategoryStats]) -> Option<&CategoryStats> {
    let per_video = |stats: &CategoryStats| stats.total_views as f64 / stats.video_count.max(1) as f64;
    categories.iter().fold(None, |best, stats| match best {
        Some(current) if per_video(current) >= per_video(stats) => Some(current),
        _ => Some(stats),
    })
}

/// Total views divided by the number of categories, 0 without categories
pub fn avg_views_per_category(categories: &[CategoryStats]) -> u64 {
    let total_views = categories
        .iter()
        .fold(0u64, |sum, stats| sum.saturating_add(stats.total_views));
    average_rounded(total_views, categories.len())
}

fn age_bucket_index(age_hours: f64) -> usize {
    AGE_BUCKETS
        .iter()
        .position(|(upper, _)| age_hours <= *upper)
        .unwrap_or(AGE_BUCKETS.len())
}

/// Hour-of-day, weekday, month and content-age distributions. Videos without a
/// readable publish time are left out of every bucket.
pub fn time_breakdown(videos: &[&VideoRecord], now: DateTime<Utc>) -> TimeBreakdown {
    let mut hourly: Vec<TimeBucketStats> = (0..24)
        .map(|hour| TimeBucketStats::empty(format!("{hour:02}:00")))
        .collect();
    let mut daily: Vec<TimeBucketStats> = DAY_LABELS.iter().map(|d| TimeBucketStats::empty(*d)).collect();
    let mut monthly: Vec<TimeBucketStats> =
        MONTH_LABELS.iter().map(|m| TimeBucketStats::empty(*m)).collect();
    let mut by_age: Vec<TimeBucketStats> = AGE_BUCKETS
        .iter()
        .map(|(_, label)| *label)
        .chain(std::iter::once(OLDEST_AGE_BUCKET))
        .map(TimeBucketStats::empty)
        .collect();

    for video in videos {
        let Some(published) = video.published() else {
            continue;
        };
        let views = video.views();

        hourly[published.hour() as usize].add(views);
        daily[published.weekday().num_days_from_sunday() as usize].add(views);
        monthly[published.month0() as usize].add(views);
        by_age[age_bucket_index(hours_between(published, now))].add(views);
    }

    for bucket in hourly
        .iter_mut()
        .chain(daily.iter_mut())
        .chain(monthly.iter_mut())
        .chain(by_age.iter_mut())
    {
        bucket.finish();
    }

    TimeBreakdown {
        hourly,
        daily,
        monthly,
        by_age,
    }
}

pub fn overview(videos: &[&VideoRecord], now: DateTime<Utc>) -> OverviewStats {
    let mut stats = OverviewStats {
        total_videos: videos.len(),
        ..Default::default()
    };

    for video in videos {
        stats.total_views = stats.total_views.saturating_add(video.views());
        stats.total_likes = stats.total_likes.saturating_add(video.likes());
        stats.total_comments = stats.total_comments.saturating_add(video.comments());

        if video
            .published()
            .is_some_and(|published| hours_between(published, now) < 24.0)
        {
            stats.recent_videos += 1;
        }
    }

    stats.avg_views = average_floored(stats.total_views, stats.total_videos);
    stats
}

/// Totals for one region's trending list
pub fn region_summary(region_code: &str, videos: &[VideoRecord]) -> RegionSummary {
    let total_views = videos
        .iter()
        .fold(0u64, |sum, video| sum.saturating_add(video.views()));
    let total_likes = videos
        .iter()
        .fold(0u64, |sum, video| sum.saturating_add(video.likes()));

    RegionSummary {
        region_code: region_code.to_string(),
        region_name: region_name(region_code)
            .unwrap_or(region_code)
            .to_string(),
        total_videos: videos.len(),
        total_views,
        total_likes,
        avg_views: average_floored(total_views, videos.len()),
    }
}

/// Put `current_region` first, then the rest by total views (stable).
pub fn rank_regions(mut summaries: Vec<RegionSummary>, current_region: &str) -> Vec<RegionSummary> {
    summaries.sort_by(|a, b| {
        let a_current = a.region_code == current_region;
        let b_current = b.region_code == current_region;
        b_current
            .cmp(&a_current)
            .then_with(|| b.total_views.cmp(&a.total_views))
    });
    summaries
}
