//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date (UTC) of this timestamp.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Whole days between the two timestamps, regardless of order.
    ///
    /// Partial days are truncated, so 6 days 23 hours is 6.
    pub fn whole_days_between(&self, other: &Timestamp) -> i64 {
        self.duration_since(other).num_days().abs()
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of hours.
    pub fn add_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn fixed() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap())
    }

    #[test]
    fn add_days_moves_forward() {
        let ts = fixed().add_days(30);
        assert_eq!(ts.as_datetime().month(), 6);
        assert_eq!(ts.as_datetime().day(), 4);
    }

    #[test]
    fn minus_days_moves_backward() {
        let ts = fixed().minus_days(5);
        assert_eq!(ts.as_datetime().day(), 30);
    }

    #[test]
    fn ordering_helpers_agree_with_ord() {
        let a = fixed();
        let b = fixed().add_hours(1);
        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
        assert!(a < b);
    }

    #[test]
    fn whole_days_between_truncates_partial_days() {
        let a = fixed();
        let b = fixed().add_days(6).add_hours(23);
        assert_eq!(a.whole_days_between(&b), 6);
        assert_eq!(b.whole_days_between(&a), 6);
    }

    #[test]
    fn whole_days_between_is_zero_within_a_day() {
        let a = fixed();
        assert_eq!(a.whole_days_between(&a.add_hours(5)), 0);
    }

    #[test]
    fn timestamp_serializes_to_rfc3339() {
        let json = serde_json::to_string(&fixed()).unwrap();
        assert!(json.contains("2024-05-05T12:00:00"));
    }

    #[test]
    fn date_returns_utc_calendar_day() {
        assert_eq!(fixed().date(), NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }
}
