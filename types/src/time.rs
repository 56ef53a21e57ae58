//! Timestamp type used throughout the protocol.
//!
//! Timestamps are Unix epoch **milliseconds** (UTC). The mesh carries them
//! either as raw integers (`emitted_at`, `computed_at`) or as RFC 3339
//! strings (`updated_at` on public voter nodes).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// The UTC calendar date of this timestamp as `YYYY-MM-DD`.
    ///
    /// This is the key the daily budget ledger resets on.
    pub fn utc_day(&self) -> String {
        self.to_datetime().format("%Y-%m-%d").to_string()
    }

    /// RFC 3339 rendering with millisecond precision, e.g.
    /// `2026-02-07T10:15:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse an RFC 3339 string back into a timestamp.
    ///
    /// Pre-epoch and malformed inputs yield `None`; hydration callers
    /// normalize that to zero rather than erroring.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        let parsed = DateTime::parse_from_rfc3339(value.trim()).ok()?;
        let millis = parsed.timestamp_millis();
        if millis < 0 {
            return None;
        }
        Some(Self(millis as u64))
    }

    fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0 as i64)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap_or_default())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_day_formats_calendar_date() {
        // 2026-02-07T00:00:00Z
        let ts = Timestamp::new(1_770_422_400_000);
        assert_eq!(ts.utc_day(), "2026-02-07");
        assert_eq!(Timestamp::EPOCH.utc_day(), "1970-01-01");
    }

    #[test]
    fn day_boundary_rolls_at_midnight_utc() {
        let before = Timestamp::new(1_770_422_400_000 - 1);
        let after = Timestamp::new(1_770_422_400_000);
        assert_eq!(before.utc_day(), "2026-02-06");
        assert_eq!(after.utc_day(), "2026-02-07");
    }

    #[test]
    fn rfc3339_round_trips() {
        let ts = Timestamp::new(1_770_422_400_123);
        let rendered = ts.to_rfc3339();
        assert!(rendered.ends_with('Z'));
        assert_eq!(Timestamp::parse_rfc3339(&rendered), Some(ts));
    }

    proptest::proptest! {
        #[test]
        fn rfc3339_round_trips_for_any_reasonable_instant(millis in 0u64..4_102_444_800_000) {
            let ts = Timestamp::new(millis);
            proptest::prop_assert_eq!(Timestamp::parse_rfc3339(&ts.to_rfc3339()), Some(ts));
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Timestamp::parse_rfc3339("not-a-date"), None);
        assert_eq!(Timestamp::parse_rfc3339(""), None);
        assert_eq!(Timestamp::parse_rfc3339("1969-12-31T23:59:59.000Z"), None);
    }
}
