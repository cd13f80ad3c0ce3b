use super::{fetch_trending, resolve_region};
use crate::models::ErrorResponse;
use crate::services::aggregation_service::{rank_regions, region_summary, RegionSummary};
use crate::services::catalog::{all_regions, RegionInfo, REGION_CODES};
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, State};

/// Trending list size used for every region summary
const SUMMARY_SAMPLE_SIZE: u32 = 20;

#[get("/")]
pub fn list_regions() -> Json<Vec<RegionInfo>> {
    Json(all_regions())
}

#[get("/<code>/summary")]
pub async fn get_region_summary(
    code: &str,
    state: &State<AppState>,
) -> Result<Json<RegionSummary>, ErrorResponse> {
    let region_code = resolve_region(Some(code.to_string()))?;
    let trending = fetch_trending(state, &region_code, SUMMARY_SAMPLE_SIZE).await?;

    info!(
        "Region summary {region_code}: {} videos",
        trending.videos.len()
    );
    Ok(Json(region_summary(&region_code, &trending.videos)))
}

/// Summaries for several regions, the current one first and the rest by views.
///
/// A region whose fetch fails is reported with zeroed totals.
#[get("/summary?<codes>&<current>")]
pub async fn compare_regions(
    codes: Option<String>,
    current: Option<String>,
    state: &State<AppState>,
) -> Result<Json<Vec<RegionSummary>>, ErrorResponse> {
    let current = resolve_region(current)?;
    let requested: Vec<String> = match codes {
        Some(codes) => codes
            .split(',')
            .filter(|code| !code.trim().is_empty())
            .map(|code| resolve_region(Some(code.to_string())))
            .collect::<Result<_, _>>()?,
        None => REGION_CODES
            .iter()
            .map(|(code, _)| code.to_string())
            .collect(),
    };

    let mut summaries = Vec::with_capacity(requested.len());
    for region_code in requested {
        let videos = match state
            .video_source
            .fetch_trending(&region_code, SUMMARY_SAMPLE_SIZE)
            .await
        {
            Ok(trending) => trending.videos,
            Err(e) => {
                error!("Failed to load stats for {region_code}: {e:?}");
                Vec::new()
            }
        };
        summaries.push(region_summary(&region_code, &videos));
    }

    info!("Compared {} regions, current {current}", summaries.len());
    Ok(Json(rank_regions(summaries, &current)))
}
