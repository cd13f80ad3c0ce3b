use chrono::{DateTime, Utc};

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Parse a counter the YouTube API sends as a numeric string.
///
/// Behaves like `parseInt`: leading whitespace is skipped and the leading run of
/// digits is used. Anything without digits (including negative numbers) is 0,
/// values too large for `u64` saturate.
pub fn parse_count(count: &str) -> u64 {
    let trimmed = count.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];

    if digits.is_empty() {
        return 0;
    }

    digits.parse::<u64>().unwrap_or(u64::MAX)
}

/// Parse ISO8601 date string, `None` if it is empty or malformed
pub fn parse_iso8601_to_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    date_str.trim().parse::<DateTime<Utc>>().ok()
}

/// Elapsed time between `earlier` and `later` in fractional days (negative if reversed).
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MS_PER_DAY
}

/// Elapsed time between `earlier` and `later` in fractional hours (negative if reversed).
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MS_PER_HOUR
}

/// `numerator / denominator`, or 0 when the result would not be a finite number.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }

    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// `part` as a percentage of `whole`, guarded like [`safe_ratio`].
pub fn percentage(part: f64, whole: f64) -> f64 {
    safe_ratio(part, whole) * 100.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}

/// Rounded mean of `total` over `count` items, 0 for an empty set.
pub fn average_rounded(total: u64, count: usize) -> u64 {
    safe_ratio(total as f64, count as f64).round() as u64
}

/// Floored mean of `total` over `count` items, 0 for an empty set.
pub fn average_floored(total: u64, count: usize) -> u64 {
    safe_ratio(total as f64, count as f64).floor() as u64
}

// Compact display form: 999, 1.2K, 3.4M, 5.6B
pub fn format_number(number: u64) -> String {
    let value = number as f64;
    if number >= 1_000_000_000 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if number >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if number >= 1_000 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        number.to_string()
    }
}

/// Relative publish label ("Just now", "5h ago", "3d ago", "2w ago", "4mo ago").
pub fn format_time_ago(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = hours_between(published_at, now).floor() as i64;
    if hours < 1 {
        return "Just now".to_string();
    }
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }

    let weeks = days / 7;
    if weeks < 4 {
        return format!("{weeks}w ago");
    }

    format!("{}mo ago", days / 30)
}

pub fn format_timestamp(seconds: f64) -> String {
    let minutes = (seconds as u32) / 60;
    let remaining_seconds = (seconds as u32) % 60;
    format!("{:02}:{:02}", minutes, remaining_seconds)
}
