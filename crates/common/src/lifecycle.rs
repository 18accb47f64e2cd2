//! Expiration rules.
//!
//! Expiration dates are stored as text, so every computation here has to cope
//! with rows that do not parse. Those rows sort and display as "far future"
//! instead of failing the page.

use chrono::NaiveDate;
use serde::Serialize;

/// Days-left value reported for an expiration that does not parse.
pub const UNKNOWN_DAYS_LEFT: i64 = 999;

/// Items with this many days left or fewer are flagged as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 3;

/// Parse an ISO `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Signed number of days from `today` until `expiration`. Negative means expired.
pub fn days_left(expiration: &str, today: NaiveDate) -> i64 {
    match parse_iso_date(expiration) {
        Some(date) => (date - today).num_days(),
        None => UNKNOWN_DAYS_LEFT,
    }
}

/// Display bucket for an item's expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Expired,
    ExpiringSoon,
    Fresh,
    Unknown,
}

impl Freshness {
    pub fn of(expiration: &str, today: NaiveDate) -> Self {
        let Some(date) = parse_iso_date(expiration) else {
            return Freshness::Unknown;
        };
        match (date - today).num_days() {
            d if d < 0 => Freshness::Expired,
            d if d <= EXPIRING_SOON_DAYS => Freshness::ExpiringSoon,
            _ => Freshness::Fresh,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Freshness::Expired => "expired",
            Freshness::ExpiringSoon => "soon",
            Freshness::Fresh => "fresh",
            Freshness::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_left_is_signed_difference() {
        let today = day(2026, 10, 19);
        assert_eq!(days_left("2026-10-22", today), 3);
        assert_eq!(days_left("2026-10-19", today), 0);
        assert_eq!(days_left("2026-10-10", today), -9);
        assert_eq!(days_left("2027-10-19", today), 365);
    }

    #[test]
    fn test_days_left_crosses_month_and_leap_boundaries() {
        assert_eq!(days_left("2028-03-01", day(2028, 2, 28)), 2);
        assert_eq!(days_left("2027-01-02", day(2026, 12, 30)), 3);
    }

    #[test]
    fn test_unparsable_expiration_yields_sentinel() {
        let today = day(2026, 10, 19);
        assert_eq!(days_left("", today), UNKNOWN_DAYS_LEFT);
        assert_eq!(days_left("next week", today), UNKNOWN_DAYS_LEFT);
        assert_eq!(days_left("2026-13-01", today), UNKNOWN_DAYS_LEFT);
    }

    #[test]
    fn test_freshness_buckets() {
        let today = day(2026, 10, 19);
        assert_eq!(Freshness::of("2026-10-18", today), Freshness::Expired);
        assert_eq!(Freshness::of("2026-10-19", today), Freshness::ExpiringSoon);
        assert_eq!(Freshness::of("2026-10-22", today), Freshness::ExpiringSoon);
        assert_eq!(Freshness::of("2026-10-23", today), Freshness::Fresh);
        assert_eq!(Freshness::of("soon", today), Freshness::Unknown);
    }
}
