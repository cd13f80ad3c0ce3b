use crate::models::{TrendingResponse, VideoRecord};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Anything that can hand out the trending list of a region.
#[rocket::async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_trending(&self, region_code: &str, max_results: u32) -> Result<TrendingResponse>;

    fn name(&self) -> &'static str;
}

/// Either one list per region code or a single list served for every region
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    PerRegion(HashMap<String, Vec<VideoRecord>>),
    Flat(Vec<VideoRecord>),
}

/// Serves previously captured trending lists from memory.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: SnapshotFile,
}

impl SnapshotSource {
    pub fn from_videos(videos: Vec<VideoRecord>) -> Self {
        Self {
            snapshot: SnapshotFile::Flat(videos),
        }
    }

    pub fn from_regions(regions: HashMap<String, Vec<VideoRecord>>) -> Self {
        let regions = regions
            .into_iter()
            .map(|(code, videos)| (code.to_uppercase(), videos))
            .collect();
        Self {
            snapshot: SnapshotFile::PerRegion(regions),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SnapshotFile =
            serde_json::from_str(json).context("Snapshot is neither a video list nor a region map")?;
        Ok(match snapshot {
            SnapshotFile::PerRegion(regions) => Self::from_regions(regions),
            flat => Self { snapshot: flat },
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let source = Self::from_json(&json)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        info!("Loaded trending snapshot from {}", path.display());
        Ok(source)
    }

    fn videos_for(&self, region_code: &str) -> &[VideoRecord] {
        match &self.snapshot {
            SnapshotFile::Flat(videos) => videos,
            SnapshotFile::PerRegion(regions) => regions
                .get(&region_code.to_uppercase())
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }
}

#[rocket::async_trait]
impl VideoSource for SnapshotSource {
    async fn fetch_trending(&self, region_code: &str, max_results: u32) -> Result<TrendingResponse> {
        let videos = self.videos_for(region_code);
        debug!(
            "Snapshot holds {} videos for region {region_code}",
            videos.len()
        );

        Ok(TrendingResponse {
            videos: videos.iter().take(max_results as usize).cloned().collect(),
            region_code: region_code.to_string(),
            total_results: videos.len() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

/// Documentation: https://developers.google.com/youtube/v3/docs/videos/list
pub fn build_trending_url(
    base_url: &str,
    region_code: &str,
    max_results: u32,
    api_key: &str,
) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/videos", base_url.trim_end_matches('/')))
        .with_context(|| format!("Invalid YouTube API base url: {base_url}"))?;

    url.query_pairs_mut()
        .append_pair("part", "snippet,statistics")
        .append_pair("chart", "mostPopular")
        .append_pair("regionCode", region_code)
        .append_pair("maxResults", &max_results.to_string())
        .append_pair("key", api_key);

    Ok(url)
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or("").to_string()
}

fn counter(value: &Value) -> String {
    value
        .as_str()
        .filter(|count| !count.is_empty())
        .unwrap_or("0")
        .to_string()
}

fn video_from_item(item: &Value) -> VideoRecord {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];
    let id = text(&item["id"]);

    VideoRecord {
        title: text(&snippet["title"]),
        channel_title: text(&snippet["channelTitle"]),
        thumbnail: text(&snippet["thumbnails"]["medium"]["url"]),
        view_count: counter(&statistics["viewCount"]),
        like_count: counter(&statistics["likeCount"]),
        comment_count: counter(&statistics["commentCount"]),
        published_at: text(&snippet["publishedAt"]),
        description: text(&snippet["description"]),
        category_id: text(&snippet["categoryId"]),
        tags: snippet["tags"]
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| tag.as_str())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        video_url: format!("{WATCH_URL}{id}"),
        id,
    }
}

/// Map a `videos.list` response body onto a [`TrendingResponse`]
pub fn parse_trending_items(data: &Value, region_code: &str) -> Result<TrendingResponse> {
    let items = data["items"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("YouTube response has no items list"))?;

    let videos: Vec<VideoRecord> = items.iter().map(video_from_item).collect();
    let total_results = data["pageInfo"]["totalResults"]
        .as_u64()
        .unwrap_or(videos.len() as u64);

    Ok(TrendingResponse {
        videos,
        region_code: region_code.to_string(),
        total_results,
    })
}

#[cfg(feature = "youtube_data_api")]
pub use api_source::YouTubeApiSource;

#[cfg(feature = "youtube_data_api")]
mod api_source {
    use super::*;
    use log::debug;
    use reqwest::Client;

    /// Live trending lists from the YouTube Data API v3.
    pub struct YouTubeApiSource {
        client: Client,
        base_url: String,
        api_key: String,
    }

    impl YouTubeApiSource {
        pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self {
                client: Client::new(),
                base_url: base_url.into(),
                api_key: api_key.into(),
            }
        }
    }

    #[rocket::async_trait]
    impl VideoSource for YouTubeApiSource {
        async fn fetch_trending(&self, region_code: &str, max_results: u32) -> Result<TrendingResponse> {
            let url = build_trending_url(&self.base_url, region_code, max_results, &self.api_key)?;
            debug!("Requesting trending videos for {region_code} ({max_results})");

            let response = self
                .client
                .get(url)
                .send()
                .await
                .context("YouTube API request failed")?;

            let status = response.status();
            if !status.is_success() {
                anyhow::bail!("YouTube API error: {}", status.as_u16());
            }

            let data = response
                .json::<Value>()
                .await
                .context("YouTube API returned malformed JSON")?;

            parse_trending_items(&data, region_code)
        }

        fn name(&self) -> &'static str {
            "youtube"
        }
    }
}
