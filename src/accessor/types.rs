//! Scalar values and the accessor contract

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Scalar
// ============================================================================

/// A field value read from a record
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Missing or null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (epoch seconds after temporal normalization)
    Int(i64),
    /// Non-integer number
    Float(f64),
    /// Text, including UUID-like identifiers
    Text(String),
    /// Native temporal value, before normalization
    DateTime(DateTime<Utc>),
}

/// Numeric view used for loose comparisons
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn compare(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (a, b) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl Scalar {
    /// Convert a JSON value. Objects and arrays keep their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Replace native temporal values with integer epoch seconds
    pub fn normalized(self) -> Self {
        match self {
            Self::DateTime(dt) => Self::Int(dt.timestamp()),
            other => other,
        }
    }

    /// Check if this is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String form: what checksums hash and what the in-memory sort compares
    pub fn string_form(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Float(f) => Cow::Owned(f.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::DateTime(dt) => Cow::Owned(dt.timestamp().to_string()),
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            Self::DateTime(dt) => Some(Number::Int(dt.timestamp())),
            Self::Text(s) => parse_numeric(s),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Loose total comparison.
    ///
    /// Numeric on both sides (numbers or numeric-looking text) compares by
    /// value; anything else compares string forms byte-wise.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.compare(b),
            _ => self.string_form().cmp(&other.string_form()),
        }
    }

    /// Equality under [`Scalar::compare`]
    pub fn loose_eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

/// Numeric-looking text: optional sign, digits, optional fraction/exponent
fn parse_numeric(s: &str) -> Option<Number> {
    let s = s.trim();
    if s.is_empty()
        || !s.bytes().any(|b| b.is_ascii_digit())
        || !s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }

    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::Int(i));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Number::Float)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_form())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.serialize_i64(dt.timestamp()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

// ============================================================================
// ValueAccessor
// ============================================================================

/// Reads the value at a dotted field path of a record
pub trait ValueAccessor<R: ?Sized> {
    /// Get the value at `path`
    fn get_value(&self, record: &R, path: &str) -> Result<Scalar>;
}

impl<R: ?Sized, F> ValueAccessor<R> for F
where
    F: Fn(&R, &str) -> Result<Scalar>,
{
    fn get_value(&self, record: &R, path: &str) -> Result<Scalar> {
        self(record, path)
    }
}
