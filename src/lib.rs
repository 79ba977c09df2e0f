// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # keyset-pager
//!
//! Drift-tolerant keyset pagination with opaque continuation tokens.
//!
//! A page is requested with a token naming where the previous page ended:
//! the boundary record's primary ordering value, how many records sharing
//! that value were already delivered, and a CRC-32 over their tie-break
//! values. If the data moved underneath the token, the pager notices and
//! serves the first page of the still-eligible records instead of failing
//! or skipping silently.
//!
//! ## Features
//!
//! - **Continuation tokens**: compact `<value>_<offset>_<checksum>` strings
//! - **Drift detection**: order value and checksum checks on every resume
//! - **Classic paging**: 1-based page numbers and 0-based offsets
//! - **Backends**: in-memory collections and DuckDB tables or queries
//! - **Temporal fields**: timestamps are compared as epoch seconds
//!
//! ## Quick Start
//!
//! ```rust
//! use keyset_pager::{JsonPager, OrderingSpec, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let records = vec![
//!         json!({ "id": "a", "score": 3 }),
//!         json!({ "id": "b", "score": 1 }),
//!         json!({ "id": "c", "score": 2 }),
//!     ];
//!     let ordering: OrderingSpec = "score,id".parse()?;
//!
//!     let mut pager = JsonPager::from_json(records, ordering)?.with_page_size(2);
//!     assert_eq!(pager.compute_page()?.len(), 2);
//!
//!     let token = pager.next_page_token()?.expect("more records");
//!     pager.set_current_page(token);
//!     assert_eq!(pager.compute_page()?.records()[0]["id"], "a");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Pager                                │
//! │  set_current_page(selector)  compute_page()  next_page_token()  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Ordering │ Accessor  │    Token      │ Selector  │   Source    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Fields   │ JSON      │ Base 36       │ None      │ In-memory   │
//! │ Asc/Desc │ Serialize │ Base64 text   │ Token     │ DuckDB      │
//! │          │ DateTime  │ CRC-32        │ Page/Off. │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Ordering definitions
pub mod ordering;

/// Record field access and scalar values
pub mod accessor;

/// Continuation tokens
pub mod token;

/// Page selectors
pub mod selector;

/// Page computation and record sources
pub mod pager;

/// Database record source via DuckDB
pub mod database;

/// Pager configuration
pub mod config;

/// Page selection from request parameters
pub mod request;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use accessor::{DateTimeAccessor, JsonAccessor, Scalar, SerializeAccessor, ValueAccessor};
pub use config::{PagerConfig, ParamNames};
pub use database::{DuckDbSource, Relation};
pub use ordering::{Direction, OrderBy, OrderingSpec};
pub use pager::{InMemorySource, JsonPager, Page, Pager, RecordSource, Resolution};
pub use selector::{PageNumber, PageOffset, PageSelector};
pub use token::ContinuationToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
