//! Pager module
//!
//! The page-computation state machine and the backend contract it fetches
//! records through.
//!
//! # Overview
//!
//! ```text
//!  records / backend ──► RecordSource::apply_ordering (once, at construction)
//!                               │
//!  set_current_page(selector) ──┤  invalidates the memoized page
//!  set_page_size(n) ────────────┤
//!                               ▼
//!  compute_page() ──► RecordSource::fetch_range(pageSize [+ token.offset])
//!                               │
//!                               ├─ none / page / offset ─► slice
//!                               └─ token ─► eligible set ─► drift check
//!                                              │                │
//!                                         exact resume     fallback to first
//!                                                          eligible page
//!  next_page_token() ◄── trailing group of the computed page
//! ```
//!
//! Drift never surfaces as an error: a stale token always resolves to a
//! correct page, reported through [`Resolution::Drifted`].

mod compute;
mod source;

pub use compute::{JsonPager, Page, Pager, Resolution, DEFAULT_PAGE_SIZE};
pub use source::{is_eligible, FetchRange, FetchRequest, InMemorySource, RecordSource};
