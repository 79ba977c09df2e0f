//! Temporal normalization
//!
//! Stores disagree on how they hand back timestamps: native values, RFC 3339
//! strings, SQL-style `YYYY-MM-DD HH:MM:SS`. Everything temporal becomes an
//! integer count of epoch seconds (UTC) before it is compared, sorted,
//! encoded into a token or hashed.

use super::types::{Scalar, ValueAccessor};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Parse a datetime string into epoch seconds.
///
/// Naive values (no offset) are read as UTC.
pub fn parse_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    // cheap reject: every accepted format starts with YYYY-MM-DD
    if s.len() < 10 || s.as_bytes()[4] != b'-' || s.as_bytes()[7] != b'-' {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.timestamp());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Normalize a single value: temporal values become `Int(epoch seconds)`
pub fn normalize_temporal(value: Scalar) -> Scalar {
    match value {
        Scalar::DateTime(dt) => Scalar::Int(dt.timestamp()),
        Scalar::Text(s) => match parse_datetime(&s) {
            Some(ts) => Scalar::Int(ts),
            None => Scalar::Text(s),
        },
        other => other,
    }
}

/// Decorates an accessor with temporal normalization
#[derive(Debug, Clone, Default)]
pub struct DateTimeAccessor<A> {
    inner: A,
}

impl<A> DateTimeAccessor<A> {
    /// Wrap an accessor
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    /// The decorated accessor
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<R: ?Sized, A: ValueAccessor<R>> ValueAccessor<R> for DateTimeAccessor<A> {
    fn get_value(&self, record: &R, path: &str) -> Result<Scalar> {
        self.inner.get_value(record, path).map(normalize_temporal)
    }
}
