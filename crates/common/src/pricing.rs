//! Price history records and trend summaries.
//!
//! Series are keyed by `(item_name, store)` text, not by item id, so history
//! outlives the inventory row it came from. Summaries are always computed from
//! the stored series on read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Relative distance from the average beyond which the latest price counts as a move.
pub const TREND_BAND: f64 = 0.05;

/// Direction of the latest price relative to the series average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

impl PriceTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceTrend::Up => "up",
            PriceTrend::Down => "down",
            PriceTrend::Stable => "stable",
        }
    }
}

/// Classify `latest` against `average`. Both bounds are exclusive.
pub fn classify_trend(latest: f64, average: f64) -> PriceTrend {
    if latest > average * (1.0 + TREND_BAND) {
        PriceTrend::Up
    } else if latest < average * (1.0 - TREND_BAND) {
        PriceTrend::Down
    } else {
        PriceTrend::Stable
    }
}

/// A stored price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: i64,
    pub item_name: String,
    pub store: String,
    pub price: f64,
    /// ISO `YYYY-MM-DD`.
    pub date_recorded: String,
}

/// A price observation about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceRecord {
    pub item_name: String,
    pub store: String,
    pub price: f64,
    pub date_recorded: NaiveDate,
}

impl NewPriceRecord {
    pub fn new(item_name: &str, store: &str, price: f64, date_recorded: NaiveDate) -> Self {
        Self {
            item_name: item_name.to_string(),
            store: store.to_string(),
            price,
            date_recorded,
        }
    }

    pub fn date_text(&self) -> String {
        self.date_recorded.format("%Y-%m-%d").to_string()
    }
}

/// Aggregates over one `(item_name, store)` series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub item_name: String,
    pub store: String,
    pub average: f64,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub trend: PriceTrend,
    /// The series, newest first.
    pub prices: Vec<PriceRecord>,
}

/// Summarise one series. Returns `None` for an empty series.
///
/// "Latest" is the record with the greatest `(date_recorded, id)`, so same-day
/// entries resolve to the one appended last regardless of input order.
pub fn summarize(item_name: &str, store: &str, mut prices: Vec<PriceRecord>) -> Option<PriceSummary> {
    prices.sort_by(|a, b| {
        b.date_recorded
            .cmp(&a.date_recorded)
            .then_with(|| b.id.cmp(&a.id))
    });
    let latest = prices.first()?.price;

    let count = prices.len();
    let min = prices.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = prices.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = prices.iter().map(|p| p.price).sum();
    // Rounding in the sum can push the mean just past an extreme.
    let mean = total / count as f64;
    let average = if min <= max { mean.clamp(min, max) } else { mean };

    Some(PriceSummary {
        item_name: item_name.to_string(),
        store: store.to_string(),
        average,
        latest,
        min,
        max,
        count,
        trend: classify_trend(latest, average),
        prices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, price: f64, date: &str) -> PriceRecord {
        PriceRecord {
            id,
            item_name: "Eggs".into(),
            store: "CornerMart".into(),
            price,
            date_recorded: date.into(),
        }
    }

    #[test]
    fn test_rising_latest_price_trends_up() {
        let series = vec![
            record(1, 3.00, "2026-10-01"),
            record(2, 3.00, "2026-10-08"),
            record(3, 3.60, "2026-10-15"),
        ];
        let summary = summarize("Eggs", "CornerMart", series).unwrap();

        assert!((summary.average - 3.20).abs() < 1e-9);
        assert_eq!(summary.latest, 3.60);
        assert_eq!(summary.min, 3.00);
        assert_eq!(summary.max, 3.60);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.trend, PriceTrend::Up);
        assert_eq!(summary.prices[0].id, 3);
    }

    #[test]
    fn test_falling_latest_price_trends_down() {
        let series = vec![
            record(1, 5.00, "2026-09-01"),
            record(2, 5.00, "2026-09-10"),
            record(3, 4.00, "2026-09-20"),
        ];
        let summary = summarize("Eggs", "CornerMart", series).unwrap();
        assert_eq!(summary.trend, PriceTrend::Down);
    }

    #[test]
    fn test_single_record_is_stable() {
        let summary = summarize("Eggs", "CornerMart", vec![record(7, 2.49, "2026-10-19")]).unwrap();
        assert_eq!(summary.average, summary.latest);
        assert_eq!(summary.trend, PriceTrend::Stable);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(summarize("Eggs", "CornerMart", Vec::new()).is_none());
    }

    #[test]
    fn test_same_day_records_resolve_by_insertion_order() {
        let series = vec![record(4, 2.00, "2026-10-19"), record(9, 3.00, "2026-10-19")];
        let summary = summarize("Eggs", "CornerMart", series).unwrap();
        assert_eq!(summary.latest, 3.00);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let average = 3.20;
        assert_eq!(classify_trend(average * 1.05, average), PriceTrend::Stable);
        assert_eq!(classify_trend(average * 0.95, average), PriceTrend::Stable);
        assert_eq!(classify_trend(average * 1.051, average), PriceTrend::Up);
        assert_eq!(classify_trend(average * 0.949, average), PriceTrend::Down);
        assert_eq!(classify_trend(average, average), PriceTrend::Stable);
    }

    #[test]
    fn test_constant_series_averages_to_its_price() {
        let series = (1..=3).map(|i| record(i, 0.1, &format!("2026-10-{:02}", i))).collect();
        let summary = summarize("Eggs", "CornerMart", series).unwrap();
        assert_eq!(summary.average, 0.1);
        assert_eq!(summary.trend, PriceTrend::Stable);
    }

    #[test]
    fn test_average_lies_within_extrema() {
        let series_set: [&[f64]; 6] = [
            &[1.0],
            &[0.1, 0.1, 0.1],
            &[0.7, 0.7, 0.7, 0.7, 0.7, 0.7, 0.7],
            &[0.99, 12.5, 3.25],
            &[4.10, 4.10, 4.10, 4.10],
            &[10.0, 0.01, 7.77, 2.5, 9.99, 0.5],
        ];
        for prices in series_set {
            let records = prices
                .iter()
                .enumerate()
                .map(|(i, p)| record(i as i64, *p, &format!("2026-01-{:02}", i + 1)))
                .collect();
            let s = summarize("Eggs", "CornerMart", records).unwrap();
            assert!(s.min <= s.average && s.average <= s.max, "{:?} -> {}", prices, s.average);
            assert_eq!(s.count, prices.len());
        }
    }
}
