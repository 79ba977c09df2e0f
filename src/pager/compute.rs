//! Page computation
//!
//! [`Pager`] memoizes the page for its current selector and page size.
//! Changing either through a setter drops the memo; nothing else does.

use super::source::{FetchRequest, InMemorySource, RecordSource};
use crate::accessor::{DateTimeAccessor, JsonAccessor, Scalar, ValueAccessor};
use crate::error::Result;
use crate::ordering::OrderingSpec;
use crate::selector::PageSelector;
use crate::token::{checksum, ContinuationToken};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

/// Page size used until one is set
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ============================================================================
// Page
// ============================================================================

/// How a page was derived from its selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// No selector: the first page
    First,
    /// Page number or offset slice
    Positional,
    /// Token resumed exactly where the previous page ended
    Resumed,
    /// Token no longer matched the data; first page of the eligible set
    Drifted,
}

impl Resolution {
    /// Get the resolution as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Positional => "positional",
            Self::Resumed => "resumed",
            Self::Drifted => "drifted",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary and tie-break values of one record
#[derive(Debug, Clone, PartialEq)]
struct BoundaryKey {
    primary: Scalar,
    tie_break: Scalar,
}

/// A computed page
#[derive(Debug, Clone)]
pub struct Page<R> {
    records: Vec<R>,
    resolution: Resolution,
    /// Keys of the skipped head of an exact resume, then keys of `records`.
    /// Empty when the page cannot be continued with a token.
    keys: Vec<BoundaryKey>,
}

impl<R> Page<R> {
    fn new(records: Vec<R>, keys: Vec<BoundaryKey>, resolution: Resolution) -> Self {
        Self {
            records,
            resolution,
            keys,
        }
    }

    fn empty(resolution: Resolution) -> Self {
        Self::new(Vec::new(), Vec::new(), resolution)
    }

    /// Records in order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Take the records
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// How the page was derived
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the page holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Token for the trailing group: the maximal run of records at the end
    /// sharing the last record's primary value.
    ///
    /// When the whole page shares the value it resumed from, the run extends
    /// into the skipped head, so ties spanning several pages keep advancing.
    fn next_token(&self) -> Result<Option<ContinuationToken>> {
        if self.records.is_empty() {
            return Ok(None);
        }

        let group = trailing_group(&self.keys);
        let Some(last) = group.last() else {
            return Ok(None);
        };

        let sum = checksum(group.iter().map(|key| &key.tie_break));
        ContinuationToken::new(last.primary.clone(), group.len(), sum).map(Some)
    }
}

impl<'a, R> IntoIterator for &'a Page<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<R> IntoIterator for Page<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

fn trailing_group(keys: &[BoundaryKey]) -> &[BoundaryKey] {
    let Some(last) = keys.last() else {
        return keys;
    };

    let start = keys
        .iter()
        .rposition(|key| !key.primary.loose_eq(&last.primary))
        .map_or(0, |index| index + 1);
    &keys[start..]
}

// ============================================================================
// Pager
// ============================================================================

/// Keyset pager over a record source
pub struct Pager<S: RecordSource, A> {
    source: S,
    accessor: A,
    ordering: OrderingSpec,
    page_size: usize,
    selector: PageSelector,
    page: Option<Page<S::Record>>,
}

/// Pager over in-memory JSON records
pub type JsonPager = Pager<InMemorySource<Value>, DateTimeAccessor<JsonAccessor>>;

impl JsonPager {
    /// Build a pager over JSON records. String fields that parse as
    /// timestamps are ordered by epoch seconds.
    pub fn from_json(
        records: impl IntoIterator<Item = Value>,
        ordering: OrderingSpec,
    ) -> Result<Self> {
        Self::new(
            InMemorySource::new(records),
            ordering,
            DateTimeAccessor::new(JsonAccessor),
        )
    }
}

impl<S, A> Pager<S, A>
where
    S: RecordSource,
    A: ValueAccessor<S::Record>,
{
    /// Create a pager and install the ordering on the source
    pub fn new(mut source: S, ordering: OrderingSpec, accessor: A) -> Result<Self> {
        source.apply_ordering(&ordering, &accessor)?;

        Ok(Self {
            source,
            accessor,
            ordering,
            page_size: DEFAULT_PAGE_SIZE,
            selector: PageSelector::None,
            page: None,
        })
    }

    /// Set the page size (builder style)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.set_page_size(page_size);
        self
    }

    /// Set the page size. Drops the memoized page.
    pub fn set_page_size(&mut self, page_size: usize) -> &mut Self {
        self.page_size = page_size;
        self.page = None;
        self
    }

    /// Set which page to compute. Drops the memoized page.
    pub fn set_current_page(&mut self, selector: impl Into<PageSelector>) -> &mut Self {
        self.selector = selector.into();
        self.page = None;
        self
    }

    /// Current page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current selector
    pub fn selector(&self) -> &PageSelector {
        &self.selector
    }

    /// Ordering installed on the source
    pub fn ordering(&self) -> &OrderingSpec {
        &self.ordering
    }

    /// The record source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consume the pager, returning the source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Memoized page, if computed
    pub fn page(&self) -> Option<&Page<S::Record>> {
        self.page.as_ref()
    }

    /// Compute the page for the current selector, or return the memo
    pub fn compute_page(&mut self) -> Result<&Page<S::Record>> {
        let page = match self.page.take() {
            Some(page) => page,
            None => self.load_page()?,
        };
        Ok(self.page.insert(page))
    }

    /// Token for the page after the current one.
    ///
    /// `None` for empty pages and for page number or offset selectors.
    pub fn next_page_token(&mut self) -> Result<Option<ContinuationToken>> {
        if self.selector.is_positional() {
            return Ok(None);
        }

        self.compute_page()?;
        match &self.page {
            Some(page) if !page.is_empty() => {
                self.ordering.token_fields()?;
                page.next_token()
            }
            _ => Ok(None),
        }
    }

    fn load_page(&self) -> Result<Page<S::Record>> {
        let resolution = match &self.selector {
            PageSelector::None => Resolution::First,
            PageSelector::Token(_) => Resolution::Resumed,
            PageSelector::PageNumber(_) | PageSelector::PageOffset(_) => Resolution::Positional,
        };

        if self.page_size == 0 {
            trace!(selector = self.selector.kind(), "Page size is zero");
            return Ok(Page::empty(resolution));
        }

        let request = FetchRequest::resolve(&self.selector, &self.ordering, self.page_size)?;
        let mut fetched = self.source.fetch_range(&request, &self.accessor)?;
        trace!(
            selector = self.selector.kind(),
            limit = request.limit,
            fetched = fetched.len(),
            "Fetched records"
        );

        match &self.selector {
            PageSelector::Token(token) => self.resume(token, fetched),
            PageSelector::None => {
                fetched.truncate(self.page_size);
                let keys = if self.ordering.supports_tokens() {
                    self.keys_of(&fetched)?
                } else {
                    Vec::new()
                };
                Ok(Page::new(fetched, keys, resolution))
            }
            PageSelector::PageNumber(_) | PageSelector::PageOffset(_) => {
                fetched.truncate(self.page_size);
                Ok(Page::new(fetched, Vec::new(), resolution))
            }
        }
    }

    fn resume(&self, token: &ContinuationToken, fetched: Vec<S::Record>) -> Result<Page<S::Record>> {
        // The source applied the range in its own native ordering
        let mut eligible = fetched;
        let mut keys = self.keys_of(&eligible)?;

        let Some(first) = keys.first() else {
            return Ok(Page::empty(Resolution::Resumed));
        };

        let head_len = token.offset().min(eligible.len());
        let drift = if !first.primary.loose_eq(token.order_value()) {
            Some("order value moved")
        } else if checksum(trailing_group(&keys[..head_len]).iter().map(|key| &key.tie_break))
            != token.checksum()
        {
            Some("checksum mismatch")
        } else {
            None
        };

        if let Some(reason) = drift {
            debug!(
                token = %token,
                reason,
                "Continuation token drifted, serving first eligible page"
            );
            eligible.truncate(self.page_size);
            keys.truncate(self.page_size);
            return Ok(Page::new(eligible, keys, Resolution::Drifted));
        }

        let records: Vec<_> = eligible
            .into_iter()
            .skip(head_len)
            .take(self.page_size)
            .collect();
        keys.truncate(head_len + records.len());
        Ok(Page::new(records, keys, Resolution::Resumed))
    }

    fn keys_of(&self, records: &[S::Record]) -> Result<Vec<BoundaryKey>> {
        records.iter().map(|record| self.key_of(record)).collect()
    }

    fn key_of(&self, record: &S::Record) -> Result<BoundaryKey> {
        let (primary, tie_break) = self.ordering.token_fields()?;
        Ok(BoundaryKey {
            primary: self.value_of(record, &primary.field)?,
            tie_break: self.value_of(record, &tie_break.field)?,
        })
    }

    fn value_of(&self, record: &S::Record, field: &str) -> Result<Scalar> {
        self.accessor
            .get_value(record, field)
            .map(Scalar::normalized)
    }
}

impl<S, A> fmt::Debug for Pager<S, A>
where
    S: RecordSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("ordering", &self.ordering)
            .field("page_size", &self.page_size)
            .field("selector", &self.selector)
            .field("computed", &self.page.is_some())
            .finish()
    }
}
