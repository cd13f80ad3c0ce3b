use super::thresholds::ThresholdTable;
use super::{benchmark_tiers, BenchmarkTier};
use crate::utils::{days_between, percentage, round_to, safe_ratio};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const MIN_AGE_DAYS: f64 = 0.01;
const RECENT_DAYS_SHOWN: usize = 3;
const PROJECTION_VIEWS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionCategory {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl ConversionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ConversionCategory::Excellent => "Excellent",
            ConversionCategory::VeryGood => "Very Good",
            ConversionCategory::Good => "Good",
            ConversionCategory::Average => "Average",
            ConversionCategory::BelowAverage => "Below Average",
        }
    }
}

/// Conversion tiers, in percent of views that subscribed
pub const CONVERSION_TIERS: ThresholdTable<ConversionCategory> = ThresholdTable::new(
    &[
        (3.0, ConversionCategory::Excellent),
        (2.0, ConversionCategory::VeryGood),
        (1.0, ConversionCategory::Good),
        (0.5, ConversionCategory::Average),
    ],
    ConversionCategory::BelowAverage,
);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubscriberDay {
    pub date: NaiveDate,
    pub gained: u64,
    pub lost: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionInput {
    pub views: u64,
    pub new_subscribers: u64,
    #[serde(default)]
    pub subscribers_lost: u64,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub channel_subscribers: u64,
    /// Channel-wide baseline conversion rate in percent
    #[serde(default)]
    pub channel_avg_conversion: f64,
    #[serde(default)]
    pub subscriber_history: Vec<SubscriberDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNet {
    pub date: NaiveDate,
    pub gained: u64,
    pub lost: u64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub conversion_rate: f64,
    pub category: ConversionCategory,
    pub net_subscribers: i64,
    pub net_conversion_rate: f64,
    /// Share of new subscribers that stayed subscribed
    pub retention_of_new_subs: f64,
    pub subscriber_velocity: u64,
    pub daily_average: u64,
    /// Signed difference to the channel baseline, in whole percent
    pub vs_channel_avg: f64,
    /// Net gain relative to the channel's subscriber count
    pub channel_growth_impact: f64,
    pub projected_per_million_views: u64,
    pub recent_days: Vec<DailyNet>,
}

fn net(gained: u64, lost: u64) -> i64 {
    (gained as i128 - lost as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

pub fn conversion_rate(views: u64, new_subscribers: u64) -> f64 {
    round_to(percentage(new_subscribers as f64, views as f64), 2)
}

/// Signed percentage difference between `rate` and the channel baseline
pub fn vs_channel_average(rate: f64, channel_avg_conversion: f64) -> f64 {
    if channel_avg_conversion == 0.0 {
        return 0.0;
    }
    round_to(percentage(rate, channel_avg_conversion) - 100.0, 0)
}

pub fn calculate_conversion(input: &ConversionInput, now: DateTime<Utc>) -> ConversionReport {
    let views = input.views as f64;
    let days_since_publish = days_between(input.published_at, now).max(MIN_AGE_DAYS);

    let rate = conversion_rate(input.views, input.new_subscribers);
    let net_subscribers = net(input.new_subscribers, input.subscribers_lost);
    let subscriber_velocity = safe_ratio(input.new_subscribers as f64, days_since_publish).round() as u64;

    let daily_average = if input.subscriber_history.is_empty() {
        subscriber_velocity
    } else {
        let gained: u64 = input
            .subscriber_history
            .iter()
            .fold(0u64, |sum, day| sum.saturating_add(day.gained));
        safe_ratio(gained as f64, input.subscriber_history.len() as f64).round() as u64
    };

    let recent_start = input.subscriber_history.len().saturating_sub(RECENT_DAYS_SHOWN);
    let recent_days = input.subscriber_history[recent_start..]
        .iter()
        .map(|day| DailyNet {
            date: day.date,
            gained: day.gained,
            lost: day.lost,
            net: net(day.gained, day.lost),
        })
        .collect();

    ConversionReport {
        conversion_rate: rate,
        category: CONVERSION_TIERS.classify(rate),
        net_subscribers,
        net_conversion_rate: round_to(percentage(net_subscribers as f64, views), 2),
        retention_of_new_subs: round_to(
            percentage(net_subscribers as f64, input.new_subscribers as f64),
            1,
        ),
        subscriber_velocity,
        daily_average,
        vs_channel_avg: vs_channel_average(rate, input.channel_avg_conversion),
        channel_growth_impact: round_to(
            percentage(net_subscribers as f64, input.channel_subscribers as f64),
            1,
        ),
        projected_per_million_views: (rate / 100.0 * PROJECTION_VIEWS).round() as u64,
        recent_days,
    }
}

pub fn benchmarks() -> Vec<BenchmarkTier> {
    benchmark_tiers(&CONVERSION_TIERS, 1.0, |category| category.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn day(d: u32, gained: u64, lost: u64) -> SubscriberDay {
        SubscriberDay {
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            gained,
            lost,
        }
    }

    fn reference(now: DateTime<Utc>) -> ConversionInput {
        ConversionInput {
            views: 850_000,
            new_subscribers: 12_500,
            subscribers_lost: 450,
            published_at: now - Duration::days(6),
            channel_subscribers: 245_000,
            channel_avg_conversion: 1.0,
            subscriber_history: vec![
                day(5, 2800, 120),
                day(6, 3200, 95),
                day(7, 2100, 80),
                day(8, 1800, 65),
                day(9, 1400, 45),
                day(10, 900, 25),
                day(11, 300, 20),
            ],
        }
    }

    #[test]
    fn reference_video_converts_well() {
        let now = Utc.with_ymd_and_hms(2024, 6, 11, 14, 0, 0).unwrap();
        let report = calculate_conversion(&reference(now), now);

        assert_eq!(report.conversion_rate, 1.47);
        assert_eq!(report.category, ConversionCategory::Good);
        assert_eq!(report.net_subscribers, 12_050);
        assert_eq!(report.net_conversion_rate, 1.42);
        assert_eq!(report.retention_of_new_subs, 96.4);
        assert_eq!(report.subscriber_velocity, 2_083);
        assert_eq!(report.daily_average, 1_786);
        assert_eq!(report.vs_channel_avg, 47.0);
        assert_eq!(report.channel_growth_impact, 4.9);
        assert_eq!(report.projected_per_million_views, 14_700);

        let dates: Vec<u32> = report.recent_days.iter().map(|d| chrono::Datelike::day(&d.date)).collect();
        assert_eq!(dates, vec![9, 10, 11]);
        assert_eq!(report.recent_days[2].net, 280);
    }

    #[test]
    fn zero_denominators_are_guarded() {
        let now = Utc::now();
        let input = ConversionInput {
            views: 0,
            new_subscribers: 0,
            subscribers_lost: 0,
            published_at: now,
            channel_subscribers: 0,
            channel_avg_conversion: 0.0,
            subscriber_history: Vec::new(),
        };

        let report = calculate_conversion(&input, now);
        assert_eq!(report.conversion_rate, 0.0);
        assert_eq!(report.retention_of_new_subs, 0.0);
        assert_eq!(report.vs_channel_avg, 0.0);
        assert_eq!(report.channel_growth_impact, 0.0);
        assert_eq!(report.subscriber_velocity, 0);
        assert_eq!(report.category, ConversionCategory::BelowAverage);
        assert!(report.recent_days.is_empty());
    }

    #[test]
    fn losing_more_than_gaining_goes_negative() {
        let now = Utc::now();
        let input = ConversionInput {
            views: 10_000,
            new_subscribers: 10,
            subscribers_lost: 30,
            published_at: now - Duration::hours(12),
            channel_subscribers: 1_000,
            channel_avg_conversion: 0.2,
            subscriber_history: Vec::new(),
        };

        let report = calculate_conversion(&input, now);
        assert_eq!(report.net_subscribers, -20);
        assert_eq!(report.net_conversion_rate, -0.2);
        assert_eq!(report.retention_of_new_subs, -200.0);
        assert_eq!(report.vs_channel_avg, -50.0);
        assert_eq!(report.subscriber_velocity, 20);
        // no history: daily average is the velocity
        assert_eq!(report.daily_average, 20);
    }

    #[test]
    fn tiers_are_inclusive() {
        let category = |new_subscribers| CONVERSION_TIERS.classify(conversion_rate(1_000, new_subscribers));
        assert_eq!(category(30), ConversionCategory::Excellent);
        assert_eq!(category(20), ConversionCategory::VeryGood);
        assert_eq!(category(10), ConversionCategory::Good);
        assert_eq!(category(5), ConversionCategory::Average);
        assert_eq!(category(4), ConversionCategory::BelowAverage);
        assert_eq!(benchmarks().len(), 5);
    }
}
