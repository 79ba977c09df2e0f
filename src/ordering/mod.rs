//! Ordering module
//!
//! Normalizes caller-supplied ordering directives into a fixed, ordered list
//! of `(field, direction)` pairs.
//!
//! # Overview
//!
//! Three input shapes are accepted, mirroring what API integrators usually
//! have at hand:
//!
//! - a bare field name (`"id"`), which sorts ascending
//! - a field → direction mapping (`{timestamp: desc, id: asc}`), in entry order
//! - an explicit list of pairs (`[["timestamp", "desc"], "id"]`)
//!
//! Token pagination needs at least two entries: the first is the *primary*
//! field the range predicate and drift check run on, the second is the
//! *tie-break* field whose values feed the continuation checksum.

mod types;

pub use types::{Direction, OrderBy, OrderingSpec};

#[cfg(test)]
mod tests;
