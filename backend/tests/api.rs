use anyhow::Result;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use trending_backend::build_rocket;
use trending_backend::models::{TrendingResponse, VideoRecord};
use trending_backend::services::metrics::MetricSettings;
use trending_backend::services::youtube_service::{SnapshotSource, VideoSource};
use trending_backend::AppState;

fn video(id: &str, category: &str, views: u64, likes: u64, comments: u64, published_at: String) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: format!("Video {id}"),
        channel_title: "Channel".to_string(),
        view_count: views.to_string(),
        like_count: likes.to_string(),
        comment_count: comments.to_string(),
        published_at,
        category_id: category.to_string(),
        video_url: format!("https://www.youtube.com/watch?v={id}"),
        ..Default::default()
    }
}

fn trending_videos() -> Vec<VideoRecord> {
    let now = Utc::now();
    let mut fresh = video("fresh", "10", 1_000_000, 45_000, 2_500, (now - Duration::hours(2)).to_rfc3339());
    fresh.title = "Big Song".to_string();
    fresh.channel_title = "Label".to_string();

    let mut old_hit = video("old", "10", 2_000_000, 10_000, 500, (now - Duration::days(10)).to_rfc3339());
    old_hit.channel_title = "Label".to_string();

    vec![
        fresh,
        video("speedrun", "20", 500_000, 80_000, 1_000, (now - Duration::days(3)).to_rfc3339()),
        old_hit,
        video("mystery", "999", 50, 1, 0, "garbage".to_string()),
    ]
}

fn client_with(source: impl VideoSource + 'static) -> Client {
    let state = AppState {
        video_source: Arc::new(source),
        metric_settings: MetricSettings::default(),
    };
    Client::tracked(build_rocket(state)).expect("valid rocket instance")
}

fn client() -> Client {
    client_with(SnapshotSource::from_videos(trending_videos()))
}

fn ids(body: &Value) -> Vec<String> {
    body["videos"]
        .as_array()
        .expect("videos array")
        .iter()
        .map(|video| video["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

struct FailingSource;

#[rocket::async_trait]
impl VideoSource for FailingSource {
    async fn fetch_trending(&self, _region_code: &str, _max_results: u32) -> Result<TrendingResponse> {
        anyhow::bail!("YouTube API error: 403")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[test]
fn index_is_alive() {
    let client = client();
    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn trending_defaults_to_views_order() {
    let client = client();
    let response = client.get("/trending").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(ids(&body), vec!["old", "fresh", "speedrun", "mystery"]);
    assert_eq!(body["regionCode"], "US");
    assert_eq!(body["fetchedCount"], 4);
    assert_eq!(body["activeFilters"], 0);
    assert_eq!(body["videos"][0]["rank"], 1);
    assert_eq!(body["videos"][0]["categoryName"], "Music");
    assert_eq!(body["stats"]["overview"]["totalVideos"], 4);
    assert_eq!(body["stats"]["overview"]["recentVideos"], 1);
}

#[test]
fn trending_applies_filters_and_sort() {
    let client = client();

    let by_likes: Value = client
        .get("/trending?region=gb&max_results=20&sort=likes")
        .dispatch()
        .into_json()
        .expect("json body");
    assert_eq!(by_likes["regionCode"], "GB");
    assert_eq!(ids(&by_likes), vec!["speedrun", "fresh", "old", "mystery"]);

    let filtered: Value = client
        .get("/trending?time=24h&search=LABEL&sort=recent")
        .dispatch()
        .into_json()
        .expect("json body");
    assert_eq!(ids(&filtered), vec!["fresh"]);
    assert_eq!(filtered["activeFilters"], 3);
    assert_eq!(filtered["filteredCount"], 1);
    assert_eq!(filtered["videos"][0]["engagement"]["rate"], 4.75);
    assert_eq!(filtered["videos"][0]["engagement"]["category"], "Very Good");
    assert_eq!(filtered["videos"][0]["publishedAgo"], "2h ago");
}

#[test]
fn unknown_category_filter_matches_exactly() {
    let client = client();
    let body: Value = client
        .get("/trending?category=999")
        .dispatch()
        .into_json()
        .expect("json body");

    assert_eq!(ids(&body), vec!["mystery"]);
    let mystery = &body["videos"][0];
    assert_eq!(mystery["categoryName"], "Unknown");
    assert_eq!(mystery["velocity"], Value::Null);
    assert_eq!(mystery["publishedAgo"], Value::Null);
}

#[test]
fn unknown_filter_keys_fall_back_to_defaults() {
    let client = client();
    let body: Value = client
        .get("/trending?time=forever&sort=random")
        .dispatch()
        .into_json()
        .expect("json body");

    assert_eq!(ids(&body), vec!["old", "fresh", "speedrun", "mystery"]);
    assert_eq!(body["activeFilters"], 0);
}

#[test]
fn invalid_request_parameters_are_rejected() {
    let client = client();

    let response = client.get("/trending?region=XX").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["error"], "Invalid region");

    for max_results in ["15", "0", "many"] {
        let response = client
            .get(format!("/trending?max_results={max_results}"))
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }
}

#[test]
fn source_failures_map_to_bad_gateway() {
    let client = client_with(FailingSource);

    let response = client.get("/trending").dispatch();
    assert_eq!(response.status(), Status::BadGateway);
    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["message"], "YouTube API error: 403");

    let response = client.get("/regions/US/summary").dispatch();
    assert_eq!(response.status(), Status::BadGateway);
}

#[test]
fn category_analysis_ranks_by_count() {
    let client = client();
    let body: Value = client
        .get("/trending/categories")
        .dispatch()
        .into_json()
        .expect("json body");

    let categories = body["categories"].as_array().expect("categories");
    let counts: Vec<(String, u64)> = categories
        .iter()
        .map(|c| {
            (
                c["categoryId"].as_str().unwrap_or_default().to_string(),
                c["videoCount"].as_u64().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        vec![
            ("10".to_string(), 2),
            ("20".to_string(), 1),
            ("999".to_string(), 1)
        ]
    );
    assert_eq!(body["topCategory"]["categoryName"], "Music");
    assert_eq!(body["topCategory"]["avgViews"], 1_500_000);
    assert_eq!(body["mostViral"]["categoryName"], "Music");
    assert_eq!(body["avgViewsPerCategory"], 1_166_683);
    assert_eq!(body["availableCategories"].as_array().map(Vec::len), Some(3));
}

#[test]
fn time_analysis_reports_buckets() {
    let client = client();
    let body: Value = client
        .get("/trending/time")
        .dispatch()
        .into_json()
        .expect("json body");

    assert_eq!(body["time"]["hourly"].as_array().map(Vec::len), Some(24));
    assert_eq!(body["time"]["daily"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["time"]["monthly"].as_array().map(Vec::len), Some(12));
    assert_eq!(body["time"]["byAge"][1]["label"], "1-6 hours");
    assert_eq!(body["time"]["byAge"][1]["videoCount"], 1);
    assert!(body["bestHour"].is_string());
    assert_eq!(body["mostRecent"][0]["id"], "fresh");
    let recent: Vec<&str> = body["mostRecent"]
        .as_array()
        .expect("most recent")
        .iter()
        .map(|video| video["id"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(recent, vec!["fresh", "speedrun", "old"]);
}

#[test]
fn regions_are_listed_and_summarized() {
    let mut regions = HashMap::new();
    regions.insert("US".to_string(), trending_videos());
    regions.insert(
        "GB".to_string(),
        vec![video("uk", "17", 9_000_000, 1, 1, Utc::now().to_rfc3339())],
    );
    let client = client_with(SnapshotSource::from_regions(regions));

    let listed: Value = client.get("/regions").dispatch().into_json().expect("json body");
    assert_eq!(listed.as_array().map(Vec::len), Some(20));
    assert_eq!(listed[0], json!({"regionCode": "US", "regionName": "United States"}));

    let summary: Value = client
        .get("/regions/us/summary")
        .dispatch()
        .into_json()
        .expect("json body");
    assert_eq!(summary["regionCode"], "US");
    assert_eq!(summary["totalVideos"], 4);
    assert_eq!(summary["totalViews"], 3_500_050);
    assert_eq!(summary["avgViews"], 875_012);

    let ranked: Value = client
        .get("/regions/summary?codes=FR,GB,US&current=fr")
        .dispatch()
        .into_json()
        .expect("json body");
    let order: Vec<&str> = ranked
        .as_array()
        .expect("summaries")
        .iter()
        .map(|summary| summary["regionCode"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(order, vec!["FR", "GB", "US"]);
    assert_eq!(ranked[0]["totalVideos"], 0);
}

#[test]
fn engagement_endpoint_rates_the_reference_video() {
    let client = client();
    let response = client
        .post("/metrics/engagement")
        .header(ContentType::JSON)
        .body(json!({"views": 1_000_000, "likes": 45_000, "comments": 2_500}).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["rate"], 4.75);
    assert_eq!(body["category"], "Very Good");
}

#[test]
fn velocity_endpoint_classifies_viral_video() {
    let client = client();
    let published_at = (Utc::now() - Duration::days(3)).to_rfc3339();
    let body: Value = client
        .post("/metrics/velocity")
        .header(ContentType::JSON)
        .body(json!({"views": 1_500_000, "publishedAt": published_at}).to_string())
        .dispatch()
        .into_json()
        .expect("json body");

    let daily = body["dailyVelocity"].as_f64().expect("daily velocity");
    assert!((daily - 500_000.0).abs() < 100.0);
    assert_eq!(body["category"], "Viral");
}

#[test]
fn retention_endpoint_flags_critical_drops() {
    let client = client();
    let samples = [
        (0, 100), (15, 85), (30, 78), (60, 72), (120, 68), (300, 58),
        (600, 45), (900, 35), (1200, 28), (1500, 22), (1800, 18),
    ];
    let points: Vec<Value> = samples
        .iter()
        .map(|(timestamp, retention)| json!({"timestamp": timestamp, "retention": retention}))
        .collect();

    let body: Value = client
        .post("/metrics/retention")
        .header(ContentType::JSON)
        .body(
            json!({
                "duration": 1800,
                "views": 450_000,
                "averageViewDuration": 900,
                "totalWatchTime": 13_500_000,
                "retentionPoints": points,
                "contentType": "tutorial"
            })
            .to_string(),
        )
        .dispatch()
        .into_json()
        .expect("json body");

    let drops = body["criticalDrops"].as_array().expect("critical drops");
    assert!(drops
        .iter()
        .any(|drop| drop["timestamp"] == 600.0 && drop["drop"] == 13.0));
    assert_eq!(body["category"], "Excellent");
}

#[test]
fn conversion_endpoint_rates_the_reference_video() {
    let client = client();
    let published_at = (Utc::now() - Duration::days(6)).to_rfc3339();
    let body: Value = client
        .post("/metrics/conversion")
        .header(ContentType::JSON)
        .body(
            json!({
                "views": 850_000,
                "newSubscribers": 12_500,
                "subscribersLost": 450,
                "publishedAt": published_at
            })
            .to_string(),
        )
        .dispatch()
        .into_json()
        .expect("json body");

    assert_eq!(body["conversionRate"], 1.47);
    assert_eq!(body["category"], "Good");
    assert_eq!(body["netSubscribers"], 12_050);
}

#[test]
fn malformed_metric_input_is_a_client_error() {
    let client = client();
    let response = client
        .post("/metrics/engagement")
        .header(ContentType::JSON)
        .body("{\"likes\": 10}")
        .dispatch();
    assert!(response.status().class().is_client_error());
}

#[test]
fn benchmarks_follow_age_and_content_type() {
    let client = client();
    let body: Value = client
        .get("/metrics/benchmarks?content_type=tutorial&age_days=10")
        .dispatch()
        .into_json()
        .expect("json body");

    assert_eq!(body["velocity"][0]["min"], 50_000.0);
    assert_eq!(body["retention"][0], json!({"min": 50.0, "label": "Excellent"}));
    assert_eq!(body["engagement"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["conversion"][4]["min"], Value::Null);
}
