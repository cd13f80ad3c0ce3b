use crate::services::metrics::retention::RetentionSettings;
use crate::services::metrics::velocity::{AgeMultiplier, VelocitySettings};
use crate::services::metrics::MetricSettings;
use crate::services::catalog::is_allowed_result_count;
use crate::services::youtube_service::{SnapshotSource, VideoSource, DEFAULT_API_BASE_URL};
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

const FALLBACK_MAX_RESULTS: u32 = 10;
const DEFAULT_SNAPSHOT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/trending_snapshot.json");

lazy_static! {
    pub static ref YOUTUBE_API_KEY: Option<String> =
        env::var("YOUTUBE_API_KEY").ok().filter(|key| !key.trim().is_empty());
    pub static ref YOUTUBE_API_BASE_URL: String =
        env::var("YOUTUBE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
    pub static ref SNAPSHOT_PATH: String =
        env::var("SNAPSHOT_PATH").unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string());
    pub static ref DEFAULT_REGION: String = env::var("DEFAULT_REGION")
        .unwrap_or_else(|_| "US".to_string())
        .to_uppercase();
    pub static ref DEFAULT_MAX_RESULTS: u32 =
        resolve_default_max_results(env::var("DEFAULT_MAX_RESULTS").ok().as_deref());
    pub static ref CORS_ALLOWED_ORIGIN: String =
        env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
}

pub fn init_logger() {
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LevelFilter::Info);

    Builder::new().filter_level(level).init();
    info!("Starting trending analytics backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// The configured default page size, if it is one of the allowed result counts
fn resolve_default_max_results(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return FALLBACK_MAX_RESULTS;
    };

    match raw.trim().parse::<u32>() {
        Ok(count) if is_allowed_result_count(count) => count,
        _ => {
            warn!("Ignoring invalid DEFAULT_MAX_RESULTS={raw}, using {FALLBACK_MAX_RESULTS}");
            FALLBACK_MAX_RESULTS
        }
    }
}

fn finite_or(name: &str, raw: Option<&str>, default: f64) -> f64 {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("Ignoring invalid {name}={raw}");
            default
        }
    }
}

fn env_or(name: &str, default: f64) -> f64 {
    finite_or(name, env::var(name).ok().as_deref(), default)
}

/// Parse `days:multiplier` pairs such as `7:0.5,3:0.7`
pub fn parse_age_multipliers(raw: &str) -> Result<Vec<AgeMultiplier>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (days, multiplier) = pair
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("Expected days:multiplier, got '{pair}'"))?;
            let older_than_days = days.trim().parse::<f64>()?;
            let multiplier = multiplier.trim().parse::<f64>()?;

            if !older_than_days.is_finite() || !multiplier.is_finite() || multiplier <= 0.0 {
                anyhow::bail!("Invalid age multiplier '{pair}'");
            }

            Ok(AgeMultiplier {
                older_than_days,
                multiplier,
            })
        })
        .collect()
}

pub fn load_metric_settings() -> Result<MetricSettings> {
    let retention_defaults = RetentionSettings::default();
    let retention = RetentionSettings {
        early_mark_seconds: env_or("EARLY_RETENTION_MARK_SECONDS", retention_defaults.early_mark_seconds),
        early_default: env_or("EARLY_RETENTION_DEFAULT", retention_defaults.early_default),
        critical_drop_threshold: env_or(
            "CRITICAL_DROP_THRESHOLD",
            retention_defaults.critical_drop_threshold,
        ),
        ..retention_defaults
    };

    let velocity = match env::var("VELOCITY_AGE_MULTIPLIERS") {
        Ok(raw) => VelocitySettings::new(parse_age_multipliers(&raw)?),
        Err(_) => VelocitySettings::default(),
    };

    Ok(MetricSettings { velocity, retention })
}

#[cfg(feature = "youtube_data_api")]
async fn create_video_source() -> Result<Arc<dyn VideoSource>> {
    use crate::services::catalog::is_allowed_result_count;
use crate::services::youtube_service::YouTubeApiSource;

    if let Some(api_key) = YOUTUBE_API_KEY.as_deref() {
        let base_url = &*YOUTUBE_API_BASE_URL;
        info!("Fetching trending videos from the YouTube Data API at: {base_url}");
        return Ok(Arc::new(YouTubeApiSource::new(base_url.as_str(), api_key)));
    }

    warn!("YOUTUBE_API_KEY not set, serving the local snapshot");
    Ok(Arc::new(SnapshotSource::load(&*SNAPSHOT_PATH).await?))
}

#[cfg(not(feature = "youtube_data_api"))]
async fn create_video_source() -> Result<Arc<dyn VideoSource>> {
    if YOUTUBE_API_KEY.is_some() {
        warn!("YOUTUBE_API_KEY is set but the youtube_data_api feature is disabled");
    }
    Ok(Arc::new(SnapshotSource::load(&*SNAPSHOT_PATH).await?))
}

pub async fn create_app_state() -> Result<AppState> {
    let metric_settings = load_metric_settings()?;
    let video_source = create_video_source().await?;
    info!("Using the {} video source", video_source.name());

    Ok(AppState {
        video_source,
        metric_settings,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[CORS_ALLOWED_ORIGIN.as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_age_multiplier_pairs() {
        let multipliers = parse_age_multipliers(" 7:0.5, 3:0.7 ,").unwrap();
        assert_eq!(
            multipliers,
            vec![
                AgeMultiplier {
                    older_than_days: 7.0,
                    multiplier: 0.5
                },
                AgeMultiplier {
                    older_than_days: 3.0,
                    multiplier: 0.7
                },
            ]
        );

        assert!(parse_age_multipliers("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_age_multipliers() {
        assert!(parse_age_multipliers("7=0.5").is_err());
        assert!(parse_age_multipliers("seven:0.5").is_err());
        assert!(parse_age_multipliers("7:0").is_err());
        assert!(parse_age_multipliers("7:-1").is_err());
    }

    #[test]
    fn default_max_results_must_be_allowed() {
        assert_eq!(resolve_default_max_results(None), 10);
        assert_eq!(resolve_default_max_results(Some("20")), 20);
        assert_eq!(resolve_default_max_results(Some(" 50 ")), 50);
        assert_eq!(resolve_default_max_results(Some("25")), 10);
        assert_eq!(resolve_default_max_results(Some("0")), 10);
        assert_eq!(resolve_default_max_results(Some("abc")), 10);
    }

    #[test]
    fn non_finite_settings_fall_back() {
        assert_eq!(finite_or("CRITICAL_DROP_THRESHOLD", Some("12.5"), 10.0), 12.5);
        assert_eq!(finite_or("CRITICAL_DROP_THRESHOLD", None, 10.0), 10.0);
        assert_eq!(finite_or("CRITICAL_DROP_THRESHOLD", Some("NaN"), 10.0), 10.0);
        assert_eq!(finite_or("CRITICAL_DROP_THRESHOLD", Some("inf"), 10.0), 10.0);
        assert_eq!(finite_or("EARLY_RETENTION_DEFAULT", Some("-infinity"), 100.0), 100.0);
        assert_eq!(finite_or("EARLY_RETENTION_DEFAULT", Some("lots"), 100.0), 100.0);
    }

    #[test]
    fn builds_cors() {
        assert!(create_cors().is_ok());
    }
}
