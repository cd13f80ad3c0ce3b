use super::{fetch_trending, resolve_max_results, resolve_region};
use crate::models::{
    CategoryAnalysisResponse, ErrorResponse, QueryResponse, TimeAnalysisResponse, VideoEntry,
};
use crate::services::aggregation_service::{avg_views_per_category, most_viral_category};
use crate::services::query_service::{available_categories, most_recent, run_query, FilterConfig};
use crate::AppState;
use chrono::Utc;
use log::info;
use rocket::serde::json::Json;
use rocket::{get, State};

const MOST_RECENT_SHOWN: usize = 3;

#[get("/?<region>&<max_results>&<category>&<time>&<search>&<sort>")]
#[allow(clippy::too_many_arguments)]
pub async fn get_trending(
    region: Option<String>,
    max_results: Option<String>,
    category: Option<String>,
    time: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    state: &State<AppState>,
) -> Result<Json<QueryResponse>, ErrorResponse> {
    let region_code = resolve_region(region)?;
    let max_results = resolve_max_results(max_results)?;
    let config = FilterConfig::from_params(category, time.as_deref(), search, sort.as_deref());

    let trending = fetch_trending(state, &region_code, max_results).await?;
    let now = Utc::now();
    let result = run_query(&trending.videos, &config, now);

    info!(
        "Trending {region_code}: {} of {} videos after {} active filters",
        result.videos.len(),
        trending.videos.len(),
        config.active_filter_count()
    );

    let videos = result
        .videos
        .iter()
        .enumerate()
        .map(|(index, video)| VideoEntry::new(index + 1, video, now, &state.metric_settings))
        .collect();

    Ok(Json(QueryResponse {
        region_code: trending.region_code.clone(),
        total_results: trending.total_results,
        fetched_count: trending.videos.len(),
        filtered_count: result.videos.len(),
        active_filters: config.active_filter_count(),
        videos,
        stats: result.stats,
        available_categories: available_categories(&trending.videos),
    }))
}

#[get("/categories?<region>&<max_results>")]
pub async fn get_category_analysis(
    region: Option<String>,
    max_results: Option<String>,
    state: &State<AppState>,
) -> Result<Json<CategoryAnalysisResponse>, ErrorResponse> {
    let region_code = resolve_region(region)?;
    let max_results = resolve_max_results(max_results)?;

    let trending = fetch_trending(state, &region_code, max_results).await?;
    let result = run_query(&trending.videos, &FilterConfig::default(), Utc::now());
    let categories = result.stats.categories;

    info!("Category analysis {region_code}: {} categories", categories.len());

    Ok(Json(CategoryAnalysisResponse {
        region_code,
        filtered_count: result.videos.len(),
        top_category: categories.first().cloned(),
        most_viral: most_viral_category(&categories).cloned(),
        avg_views_per_category: avg_views_per_category(&categories),
        categories,
        available_categories: available_categories(&trending.videos),
    }))
}

#[get("/time?<region>&<max_results>")]
pub async fn get_time_analysis(
    region: Option<String>,
    max_results: Option<String>,
    state: &State<AppState>,
) -> Result<Json<TimeAnalysisResponse>, ErrorResponse> {
    let region_code = resolve_region(region)?;
    let max_results = resolve_max_results(max_results)?;

    let trending = fetch_trending(state, &region_code, max_results).await?;
    let result = run_query(&trending.videos, &FilterConfig::default(), Utc::now());
    let time = result.stats.time;

    info!("Time analysis {region_code}: {} videos", result.videos.len());

    Ok(Json(TimeAnalysisResponse {
        region_code,
        filtered_count: result.videos.len(),
        best_hour: time
            .best_hour()
            .filter(|bucket| bucket.video_count > 0)
            .map(|bucket| bucket.label.clone()),
        best_day: time
            .best_day()
            .filter(|bucket| bucket.video_count > 0)
            .map(|bucket| bucket.label.clone()),
        most_recent: most_recent(&result.videos, MOST_RECENT_SHOWN)
            .into_iter()
            .cloned()
            .collect(),
        time,
    }))
}
