//! Value accessor module
//!
//! Reads a field's value out of a record, whatever shape the record has.
//!
//! # Overview
//!
//! The pager never inspects records itself. Every comparison, sort key,
//! token value and checksum input goes through a [`ValueAccessor`] injected
//! at construction time:
//!
//! - [`JsonAccessor`] resolves dotted paths over `serde_json::Value`
//!   (the shape database adapters return)
//! - [`SerializeAccessor`] does the same for any `Serialize` struct
//! - any `Fn(&R, &str) -> Result<Scalar>` closure is an accessor
//! - [`DateTimeAccessor`] decorates another accessor and normalizes
//!   temporal values to integer epoch seconds

mod datetime;
mod json;
mod types;

pub use datetime::{normalize_temporal, parse_datetime, DateTimeAccessor};
pub use json::{lookup_path, JsonAccessor, SerializeAccessor};
pub use types::{Scalar, ValueAccessor};

#[cfg(test)]
mod tests;
