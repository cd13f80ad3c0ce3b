use crate::services::metrics::conversion::{self, calculate_conversion, ConversionInput, ConversionReport};
use crate::services::metrics::engagement::{self, calculate_engagement, EngagementInput, EngagementReport};
use crate::services::metrics::retention::{
    self, calculate_retention, ContentType, RetentionInput, RetentionReport,
};
use crate::services::metrics::velocity::{
    self, calculate_velocity_report, VelocityInput, VelocityReport,
};
use crate::services::metrics::{BenchmarkTier, MetricSettings};
use crate::AppState;
use chrono::Utc;
use log::info;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkTables {
    pub engagement: Vec<BenchmarkTier>,
    pub velocity: Vec<BenchmarkTier>,
    pub retention: Vec<BenchmarkTier>,
    pub conversion: Vec<BenchmarkTier>,
    pub settings: MetricSettings,
}

/// Threshold tables, with velocity scaled for `age_days` and retention for
/// `content_type`
#[get("/benchmarks?<content_type>&<age_days>")]
pub fn get_benchmarks(
    content_type: Option<String>,
    age_days: Option<f64>,
    state: &State<AppState>,
) -> Json<BenchmarkTables> {
    let content_type = content_type
        .as_deref()
        .map(ContentType::from_key)
        .unwrap_or_default();
    let age_days = age_days.filter(|days| days.is_finite()).unwrap_or(0.0);

    Json(BenchmarkTables {
        engagement: engagement::benchmarks(),
        velocity: velocity::benchmarks(age_days, &state.metric_settings.velocity),
        retention: retention::benchmarks(content_type),
        conversion: conversion::benchmarks(),
        settings: state.metric_settings.clone(),
    })
}

#[post("/engagement", data = "<input>")]
pub fn engagement_report(input: Json<EngagementInput>) -> Json<EngagementReport> {
    let report = calculate_engagement(&input);
    info!("Engagement {}% ({})", report.rate, report.category.label());
    Json(report)
}

#[post("/velocity", data = "<input>")]
pub fn velocity_report(input: Json<VelocityInput>, state: &State<AppState>) -> Json<VelocityReport> {
    let report = calculate_velocity_report(&input, Utc::now(), &state.metric_settings.velocity);
    info!(
        "Velocity {}/day ({})",
        report.daily_velocity,
        report.category.label()
    );
    Json(report)
}

#[post("/retention", data = "<input>")]
pub fn retention_report(input: Json<RetentionInput>, state: &State<AppState>) -> Json<RetentionReport> {
    let report = calculate_retention(&input, &state.metric_settings.retention);
    info!(
        "Retention {}% ({}), {} critical drops",
        report.avg_retention_rate,
        report.category.label(),
        report.critical_drops.len()
    );
    Json(report)
}

#[post("/conversion", data = "<input>")]
pub fn conversion_report(input: Json<ConversionInput>) -> Json<ConversionReport> {
    let report = calculate_conversion(&input, Utc::now());
    info!(
        "Conversion {}% ({})",
        report.conversion_rate,
        report.category.label()
    );
    Json(report)
}
