//! Token value object and wire codec

use crate::accessor::Scalar;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Segment delimiter
pub const TOKEN_DELIMITER: char = '_';

/// Marks a base64-encoded (non-integer) order value
const TEXT_PREFIX: char = '=';

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static ORDER_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^-?[0-9a-z]*$").expect("Invalid regex"));

// ============================================================================
// Base 36
// ============================================================================

/// Encode an unsigned integer in lowercase base 36
pub fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Encode a signed integer, negative values with a leading `-`
fn encode_signed_base36(value: i64) -> String {
    if value < 0 {
        format!("-{}", encode_base36(value.unsigned_abs()))
    } else {
        encode_base36(value.unsigned_abs())
    }
}

/// Decode case-insensitive base 36 into an unsigned integer
pub fn decode_base36(s: &str) -> Option<u64> {
    if s.is_empty() || s.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}

fn decode_signed_base36(s: &str) -> Option<i64> {
    match s.strip_prefix('-') {
        Some(rest) => {
            let magnitude = decode_base36(rest)?;
            0i64.checked_sub_unsigned(magnitude)
        }
        None => i64::try_from(decode_base36(s)?).ok(),
    }
}

// ============================================================================
// ContinuationToken
// ============================================================================

/// Immutable `(orderValue, offset, checksum)` triple
///
/// Only integers keep their type on the wire. Every other order value,
/// including floats and booleans, decodes as text, so equality compares
/// order values with [`Scalar::loose_eq`].
#[derive(Debug, Clone)]
pub struct ContinuationToken {
    /// Primary-field value of the previous page's boundary record
    order_value: Scalar,
    /// Records sharing that value already delivered
    offset: usize,
    /// CRC-32 of that group's tie-break values, in page order
    checksum: u32,
}

impl ContinuationToken {
    /// Create a token. `offset` must be at least 1.
    pub fn new(order_value: impl Into<Scalar>, offset: usize, checksum: u32) -> Result<Self> {
        if offset < 1 {
            return Err(Error::invalid_argument("Offset cannot be less than 1"));
        }

        Ok(Self {
            order_value: order_value.into().normalized(),
            offset,
            checksum,
        })
    }

    /// Parse a wire string
    pub fn parse(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token.split(TOKEN_DELIMITER).collect();
        let [order_part, offset_part, checksum_part] = segments.as_slice() else {
            return Err(Error::invalid_token(format!(
                "Malformed token: expected 3 segments, found {}",
                segments.len()
            )));
        };

        let order_value = match order_part.strip_prefix(TEXT_PREFIX) {
            None if order_part.is_empty() => Scalar::Null,
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| Error::invalid_token(format!("Bad order value encoding: {e}")))?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| Error::invalid_token("Order value is not valid UTF-8"))?;
                Scalar::Text(text)
            }
            None => decode_signed_base36(order_part)
                .map(Scalar::Int)
                .ok_or_else(|| {
                    Error::invalid_token(format!("Bad order value segment '{order_part}'"))
                })?,
        };

        let offset = offset_part
            .parse::<usize>()
            .map_err(|_| Error::invalid_token(format!("Bad offset segment '{offset_part}'")))?;
        if offset < 1 {
            return Err(Error::invalid_token("Offset cannot be less than 1"));
        }

        let checksum = decode_base36(checksum_part)
            .and_then(|c| u32::try_from(c).ok())
            .ok_or_else(|| {
                Error::invalid_token(format!("Bad checksum segment '{checksum_part}'"))
            })?;

        Ok(Self {
            order_value,
            offset,
            checksum,
        })
    }

    /// Primary value the next page starts from
    pub fn order_value(&self) -> &Scalar {
        &self.order_value
    }

    /// Records to skip among those sharing the order value
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Checksum of the skipped group
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Encode to the wire string
    pub fn encode(&self) -> String {
        let order_part = match &self.order_value {
            Scalar::Null => String::new(),
            Scalar::Int(value) => encode_signed_base36(*value),
            other => format!("{TEXT_PREFIX}{}", STANDARD.encode(other.string_form().as_bytes())),
        };

        format!(
            "{order_part}{TOKEN_DELIMITER}{}{TOKEN_DELIMITER}{}",
            self.offset,
            encode_base36(u64::from(self.checksum))
        )
    }
}

/// Cheap pre-check before [`ContinuationToken::parse`]: three segments and a
/// first segment that is either `=`-prefixed or plain base 36.
pub fn is_valid(token: &str) -> bool {
    let segments: Vec<&str> = token.split(TOKEN_DELIMITER).collect();
    if segments.len() != 3 {
        return false;
    }

    segments[0].starts_with(TEXT_PREFIX) || ORDER_SEGMENT_REGEX.is_match(segments[0])
}

impl PartialEq for ContinuationToken {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.checksum == other.checksum
            && self.order_value.loose_eq(&other.order_value)
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ContinuationToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContinuationToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContinuationToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
