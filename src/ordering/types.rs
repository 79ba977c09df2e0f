//! Ordering types
//!
//! `OrderingSpec` is an immutable value object: it is built once per pager
//! and only ever replaced, never mutated.

use crate::error::{Error, Result};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Direction
// ============================================================================

/// Sort direction of one ordering entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Direction {
    /// Parse a direction string.
    ///
    /// Matching is case-insensitive and by substring, so `"DESC"`,
    /// `"descending"` and `"Asc"` are all accepted. Anything mentioning
    /// neither keyword is rejected.
    pub fn parse(direction: &str) -> Result<Self> {
        let lower = direction.to_ascii_lowercase();
        if lower.contains("desc") {
            Ok(Self::Desc)
        } else if lower.contains("asc") {
            Ok(Self::Asc)
        } else {
            Err(Error::invalid_argument(format!(
                "Invalid ordering direction \"{direction}\""
            )))
        }
    }

    /// Lowercase keyword (`asc` / `desc`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// SQL keyword (`ASC` / `DESC`)
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result to this direction
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    /// Check if this is ascending
    pub fn is_asc(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// OrderBy
// ============================================================================

/// A single `(field, direction)` ordering entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    /// Dotted field path
    pub field: String,
    /// Sort direction
    pub direction: Direction,
}

impl OrderBy {
    /// Create an ordering entry
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending entry
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    /// Descending entry
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }
}

/// Parses `field` or `field:direction`
impl FromStr for OrderBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, direction)) => (field.trim(), Direction::parse(direction)?),
            None => (s, Direction::Asc),
        };

        if field.is_empty() {
            return Err(Error::invalid_argument("Ordering field name cannot be empty"));
        }

        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

// ============================================================================
// OrderingSpec
// ============================================================================

/// Normalized, ordered list of ordering entries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderingSpec {
    entries: Vec<OrderBy>,
}

impl OrderingSpec {
    /// Build from already-normalized entries
    pub fn new(entries: Vec<OrderBy>) -> Self {
        Self { entries }
    }

    /// Empty spec: positional paging only, no drift protection
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single ascending field
    pub fn field(field: impl Into<String>) -> Self {
        Self::new(vec![OrderBy::asc(field)])
    }

    /// Build from `(field, direction)` string pairs, in order
    pub fn from_pairs<I, F, D>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (F, D)>,
        F: Into<String>,
        D: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(field, direction)| Ok(OrderBy::new(field, Direction::parse(direction.as_ref())?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    /// Build from bare field names, all ascending
    pub fn from_fields<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self::new(fields.into_iter().map(OrderBy::asc).collect())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at index
    pub fn get(&self, index: usize) -> Option<&OrderBy> {
        self.entries.get(index)
    }

    /// Primary (range / drift) entry
    pub fn primary(&self) -> Option<&OrderBy> {
        self.entries.first()
    }

    /// Tie-break (checksum / identity) entry
    pub fn tie_break(&self) -> Option<&OrderBy> {
        self.entries.get(1)
    }

    /// Iterate entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, OrderBy> {
        self.entries.iter()
    }

    /// Check whether continuation tokens can be used with this spec
    pub fn supports_tokens(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Primary and tie-break entries, or a configuration error when the ordering
    /// is too short for token pagination.
    pub fn token_fields(&self) -> Result<(&OrderBy, &OrderBy)> {
        match (self.primary(), self.tie_break()) {
            (Some(primary), Some(tie_break)) => Ok((primary, tie_break)),
            _ => Err(Error::config(
                "ordering must have at least 2 \"field\" => \"direction(ASC|DESC)\" entries. \
                 The first is the reference value, the second is the checksum field.",
            )),
        }
    }
}

impl<'a> IntoIterator for &'a OrderingSpec {
    type Item = &'a OrderBy;
    type IntoIter = std::slice::Iter<'a, OrderBy>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<Vec<OrderBy>> for OrderingSpec {
    fn from(entries: Vec<OrderBy>) -> Self {
        Self::new(entries)
    }
}

/// Parses a comma-separated list of `field[:direction]` entries
impl FromStr for OrderingSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let entries = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(OrderBy::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }
}

impl fmt::Display for OrderingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

// ============================================================================
// Serde
// ============================================================================

/// One element of the list form
#[derive(Deserialize)]
#[serde(untagged)]
enum OrderingItem {
    Field(String),
    Pair(String, String),
    Map(BTreeMap<String, String>),
}

impl OrderingItem {
    fn into_order_by<E: de::Error>(self) -> std::result::Result<OrderBy, E> {
        match self {
            Self::Field(field) => Ok(OrderBy::asc(field)),
            Self::Pair(field, direction) => Direction::parse(&direction)
                .map(|direction| OrderBy::new(field, direction))
                .map_err(E::custom),
            Self::Map(map) => {
                if map.len() != 1 {
                    return Err(E::custom(
                        "each ordering map in a list must name exactly one field",
                    ));
                }
                let (field, direction) = map.into_iter().next().ok_or_else(|| {
                    E::custom("each ordering map in a list must name exactly one field")
                })?;
                Direction::parse(&direction)
                    .map(|direction| OrderBy::new(field, direction))
                    .map_err(E::custom)
            }
        }
    }
}

struct OrderingVisitor;

impl<'de> Visitor<'de> for OrderingVisitor {
    type Value = OrderingSpec;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a field name, a field => direction map, or a list of orderings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(OrderingSpec::field(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(OrderingSpec::empty())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(OrderingSpec::empty())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = Vec::new();
        while let Some((field, direction)) = map.next_entry::<String, String>()? {
            let direction = Direction::parse(&direction).map_err(de::Error::custom)?;
            entries.push(OrderBy::new(field, direction));
        }
        Ok(OrderingSpec::new(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = Vec::new();
        while let Some(item) = seq.next_element::<OrderingItem>()? {
            entries.push(item.into_order_by()?);
        }
        Ok(OrderingSpec::new(entries))
    }
}

impl<'de> Deserialize<'de> for OrderingSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(OrderingVisitor)
    }
}

/// Serializes as a list of `[field, direction]` pairs
impl Serialize for OrderingSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(&(entry.field.as_str(), entry.direction.as_str()))?;
        }
        seq.end()
    }
}
