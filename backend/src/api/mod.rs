mod metrics;
mod regions;
mod status;
mod trending;

pub use metrics::*;
pub use regions::*;
pub use status::*;
pub use trending::*;

use crate::config::{DEFAULT_MAX_RESULTS, DEFAULT_REGION};
use crate::models::{ErrorResponse, TrendingResponse};
use crate::services::catalog::{is_allowed_result_count, region_name, ALLOWED_RESULT_COUNTS};
use crate::AppState;
use log::{debug, error};

/// Upper-cased region code, or 400 if it is not a supported region
pub(crate) fn resolve_region(region: Option<String>) -> Result<String, ErrorResponse> {
    let code = match region {
        Some(region) if !region.trim().is_empty() => region.trim().to_uppercase(),
        _ => DEFAULT_REGION.clone(),
    };

    if region_name(&code).is_none() {
        return Err(ErrorResponse::bad_request(
            "Invalid region",
            format!("Unsupported region code: {code}"),
        ));
    }
    Ok(code)
}

pub(crate) fn resolve_max_results(max_results: Option<String>) -> Result<u32, ErrorResponse> {
    let Some(raw) = max_results else {
        return Ok(*DEFAULT_MAX_RESULTS);
    };

    match raw.trim().parse::<u32>() {
        Ok(count) if is_allowed_result_count(count) => Ok(count),
        _ => Err(ErrorResponse::bad_request(
            "Invalid max_results",
            format!("max_results must be one of {ALLOWED_RESULT_COUNTS:?}, got '{raw}'"),
        )),
    }
}

/// Fetch a trending list, mapping source failures to 502
pub(crate) async fn fetch_trending(
    state: &AppState,
    region_code: &str,
    max_results: u32,
) -> Result<TrendingResponse, ErrorResponse> {
    match state
        .video_source
        .fetch_trending(region_code, max_results)
        .await
    {
        Ok(response) => {
            debug!(
                "{} returned {} videos for {region_code}",
                state.video_source.name(),
                response.videos.len()
            );
            Ok(response)
        }
        Err(e) => {
            error!("Failed to fetch trending videos for {region_code}: {e:?}");
            Err(ErrorResponse::bad_gateway(
                "Failed to fetch trending videos",
                e.to_string(),
            ))
        }
    }
}
