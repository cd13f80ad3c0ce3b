#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use rocket::{Build, Rocket};
use services::metrics::MetricSettings;
use services::youtube_service::VideoSource;
use std::sync::Arc;

pub struct AppState {
    pub video_source: Arc<dyn VideoSource>,
    pub metric_settings: MetricSettings,
}

/// Rocket instance with every route mounted and `state` managed
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![api::index])
        .mount(
            "/trending",
            routes![
                api::get_trending,
                api::get_category_analysis,
                api::get_time_analysis
            ],
        )
        .mount(
            "/regions",
            routes![
                api::list_regions,
                api::get_region_summary,
                api::compare_regions
            ],
        )
        .mount(
            "/metrics",
            routes![
                api::get_benchmarks,
                api::engagement_report,
                api::velocity_report,
                api::retention_report,
                api::conversion_report
            ],
        )
}
