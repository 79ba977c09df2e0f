//! Record sources
//!
//! One implementation per storage technology. The pager hands every source
//! the same request: an ordering, a range, and a required record count that
//! is never smaller than `pageSize + token.offset` for token resumes.

use crate::accessor::{Scalar, ValueAccessor};
use crate::error::Result;
use crate::ordering::{Direction, OrderBy, OrderingSpec};
use crate::selector::PageSelector;
use std::cmp::Ordering;
use std::sync::Arc;

// ============================================================================
// Fetch requests
// ============================================================================

/// Where a fetch starts in the ordered set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchRange<'a> {
    /// From the first record
    Start,
    /// After skipping this many records
    Offset(usize),
    /// Records whose primary value is at or beyond `value`
    /// (`>=` ascending, `<=` descending)
    From {
        /// Primary ordering entry
        primary: &'a OrderBy,
        /// Boundary value from the continuation token
        value: &'a Scalar,
    },
}

/// A single ranged fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest<'a> {
    /// Ordering the records must come back in
    pub ordering: &'a OrderingSpec,
    /// Start of the range
    pub range: FetchRange<'a>,
    /// Number of records required
    pub limit: usize,
}

impl<'a> FetchRequest<'a> {
    /// Translate a selector into a fetch request.
    ///
    /// Token selectors require an ordering with a primary and a tie-break
    /// field and fetch `page_size + token.offset` records.
    pub fn resolve(
        selector: &'a PageSelector,
        ordering: &'a OrderingSpec,
        page_size: usize,
    ) -> Result<Self> {
        let (range, limit) = match selector {
            PageSelector::None => (FetchRange::Start, page_size),
            PageSelector::PageNumber(number) => {
                (FetchRange::Offset(number.offset_for(page_size)), page_size)
            }
            PageSelector::PageOffset(offset) => (FetchRange::Offset(offset.get()), page_size),
            PageSelector::Token(token) => {
                let (primary, _) = ordering.token_fields()?;
                (
                    FetchRange::From {
                        primary,
                        value: token.order_value(),
                    },
                    page_size.saturating_add(token.offset()),
                )
            }
        };

        Ok(Self {
            ordering,
            range,
            limit,
        })
    }
}

/// Range predicate of the eligible set
pub fn is_eligible(value: &Scalar, boundary: &Scalar, direction: Direction) -> bool {
    match direction {
        Direction::Asc => value.compare(boundary) != Ordering::Less,
        Direction::Desc => value.compare(boundary) != Ordering::Greater,
    }
}

// ============================================================================
// RecordSource
// ============================================================================

/// Backend collaborator contract
pub trait RecordSource {
    /// Record type handed back to callers
    type Record;

    /// Install the ordering. Called once when a pager is built.
    fn apply_ordering(
        &mut self,
        ordering: &OrderingSpec,
        accessor: &dyn ValueAccessor<Self::Record>,
    ) -> Result<()>;

    /// Fetch up to `request.limit` records of the requested range, in order.
    ///
    /// The source alone decides which records fall in a `FetchRange::From`
    /// range, using the same ordering it sorts by.
    ///
    /// Failures are returned to the caller as-is; the pager never retries.
    fn fetch_range(
        &self,
        request: &FetchRequest<'_>,
        accessor: &dyn ValueAccessor<Self::Record>,
    ) -> Result<Vec<Self::Record>>;
}

// ============================================================================
// InMemorySource
// ============================================================================

/// Source owning the full record collection
///
/// `apply_ordering` performs one stable sort; records that tie on every
/// ordering entry keep their original relative order.
#[derive(Debug, Clone)]
pub struct InMemorySource<R> {
    records: Arc<Vec<R>>,
    ordered_by: Option<OrderingSpec>,
}

impl<R> InMemorySource<R> {
    /// Wrap a record collection
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: Arc::new(records.into_iter().collect()),
            ordered_by: None,
        }
    }

    /// Share an existing collection
    pub fn from_arc(records: Arc<Vec<R>>) -> Self {
        Self {
            records,
            ordered_by: None,
        }
    }

    /// Records in current order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn compare_keys(ordering: &OrderingSpec, a: &[Scalar], b: &[Scalar]) -> Ordering {
    ordering
        .iter()
        .zip(a.iter().zip(b))
        .map(|(entry, (x, y))| entry.direction.apply(x.compare(y)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl<R: Clone> RecordSource for InMemorySource<R> {
    type Record = R;

    fn apply_ordering(
        &mut self,
        ordering: &OrderingSpec,
        accessor: &dyn ValueAccessor<R>,
    ) -> Result<()> {
        if self.ordered_by.as_ref() == Some(ordering) {
            return Ok(());
        }

        if !ordering.is_empty() {
            let mut keyed = self
                .records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    let key = ordering
                        .iter()
                        .map(|entry| {
                            accessor
                                .get_value(record, &entry.field)
                                .map(Scalar::normalized)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok((key, index))
                })
                .collect::<Result<Vec<_>>>()?;

            // sort_by is stable
            keyed.sort_by(|(a, _), (b, _)| compare_keys(ordering, a, b));

            let sorted = keyed
                .into_iter()
                .map(|(_, index)| self.records[index].clone())
                .collect();
            self.records = Arc::new(sorted);
        }

        self.ordered_by = Some(ordering.clone());
        Ok(())
    }

    fn fetch_range(
        &self,
        request: &FetchRequest<'_>,
        accessor: &dyn ValueAccessor<R>,
    ) -> Result<Vec<R>> {
        match request.range {
            FetchRange::Start => Ok(self.records.iter().take(request.limit).cloned().collect()),
            FetchRange::Offset(offset) => Ok(self
                .records
                .iter()
                .skip(offset)
                .take(request.limit)
                .cloned()
                .collect()),
            FetchRange::From { primary, value } => {
                let mut fetched = Vec::new();
                for record in self.records.iter() {
                    if fetched.len() >= request.limit {
                        break;
                    }
                    let current = accessor.get_value(record, &primary.field)?.normalized();
                    if is_eligible(&current, value, primary.direction) {
                        fetched.push(record.clone());
                    }
                }
                Ok(fetched)
            }
        }
    }
}
