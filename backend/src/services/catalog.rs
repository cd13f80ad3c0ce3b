use serde::Serialize;

/// Label for category ids missing from [`VIDEO_CATEGORIES`]
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Result counts the trending endpoint may be asked for
pub const ALLOWED_RESULT_COUNTS: [u32; 4] = [10, 20, 30, 50];

/// YouTube video category ids and their display names
pub const VIDEO_CATEGORIES: &[(&str, &str)] = &[
    ("1", "Film & Animation"),
    ("2", "Autos & Vehicles"),
    ("10", "Music"),
    ("15", "Pets & Animals"),
    ("17", "Sports"),
    ("18", "Short Movies"),
    ("19", "Travel & Events"),
    ("20", "Gaming"),
    ("21", "Videoblogging"),
    ("22", "People & Blogs"),
    ("23", "Comedy"),
    ("24", "Entertainment"),
    ("25", "News & Politics"),
    ("26", "Howto & Style"),
    ("27", "Education"),
    ("28", "Science & Technology"),
    ("29", "Nonprofits & Activism"),
    ("30", "Movies"),
    ("31", "Anime/Animation"),
    ("32", "Action/Adventure"),
    ("33", "Classics"),
    ("34", "Documentary"),
    ("35", "Drama"),
    ("36", "Family"),
    ("37", "Foreign"),
    ("38", "Horror"),
    ("39", "Sci-Fi/Fantasy"),
    ("40", "Thriller"),
    ("41", "Shorts"),
    ("42", "Shows"),
    ("43", "Trailers"),
];

/// Regions the trending chart can be requested for
pub const REGION_CODES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("IN", "India"),
    ("PK", "Pakistan"),
    ("GB", "United Kingdom"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("RU", "Russia"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("NL", "Netherlands"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub region_code: &'static str,
    pub region_name: &'static str,
}

pub fn category_name(category_id: &str) -> &'static str {
    VIDEO_CATEGORIES
        .iter()
        .find(|(id, _)| *id == category_id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_CATEGORY)
}

pub fn region_name(region_code: &str) -> Option<&'static str> {
    REGION_CODES
        .iter()
        .find(|(code, _)| *code == region_code)
        .map(|(_, name)| *name)
}

pub fn all_regions() -> Vec<RegionInfo> {
    REGION_CODES
        .iter()
        .map(|(code, name)| RegionInfo {
            region_code: code,
            region_name: name,
        })
        .collect()
}

pub fn is_allowed_result_count(max_results: u32) -> bool {
    ALLOWED_RESULT_COUNTS.contains(&max_results)
}
