//! # Temporal Types: UTC-Only Timestamps
//!
//! `Timestamp` is a UTC instant truncated to seconds. License validity
//! windows are computed with [`Timestamp::add_calendar_years`], which uses
//! calendar month arithmetic: issued 2024-03-10 expires 2025-03-10, never
//! "365 days later". A Feb 29 issue date clamps to Feb 28 of the target year.

use chrono::{DateTime, Datelike, Months, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let malformed = |reason: String| ValidationError::Malformed {
            kind: "timestamp",
            value: s.to_string(),
            reason,
        };
        if !s.ends_with('Z') {
            return Err(malformed("must use Z suffix (UTC only)".to_string()));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| malformed(e.to_string()))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar year of this instant.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Advance by whole calendar years.
    pub fn add_calendar_years(&self, years: u32) -> Result<Self, ValidationError> {
        let months = years
            .checked_mul(12)
            .ok_or_else(|| ValidationError::OutOfRange(format!("{self} + {years} years")))?;
        self.0
            .checked_add_months(Months::new(months))
            .map(Self)
            .ok_or_else(|| ValidationError::OutOfRange(format!("{self} + {years} years")))
    }

    /// `YYYY-MM-DD` rendering, used in operator-facing messages.
    pub fn to_date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Render as ISO8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
