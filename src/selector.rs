//! Page selectors
//!
//! What the caller asks for: the first page, a continuation token, a
//! 1-based page number or a 0-based record offset. Replacing the selector
//! on a pager invalidates its memoized page.

use crate::error::{Error, Result};
use crate::token::ContinuationToken;
use std::fmt;

/// 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageNumber(usize);

impl PageNumber {
    /// Create a page number, rejecting anything below 1
    pub fn new(number: i64) -> Result<Self> {
        if number < 1 {
            return Err(Error::invalid_argument("Page number cannot be less than 1"));
        }
        usize::try_from(number)
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("Page number {number} is too large")))
    }

    /// The page number
    pub fn get(&self) -> usize {
        self.0
    }

    /// Record offset of this page for a given page size
    pub fn offset_for(&self, page_size: usize) -> usize {
        (self.0 - 1).saturating_mul(page_size)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 0-based record offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageOffset(usize);

impl PageOffset {
    /// Create an offset, rejecting negative values
    pub fn new(offset: i64) -> Result<Self> {
        if offset < 0 {
            return Err(Error::invalid_argument("Offset cannot be less than 0"));
        }
        usize::try_from(offset)
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("Offset {offset} is too large")))
    }

    /// The offset
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which page to compute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageSelector {
    /// First page, no token yet
    #[default]
    None,
    /// Resume from a continuation token
    Token(ContinuationToken),
    /// Classic page number (no drift protection)
    PageNumber(PageNumber),
    /// Classic record offset (no drift protection)
    PageOffset(PageOffset),
}

impl PageSelector {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Token(_) => "token",
            Self::PageNumber(_) => "page_number",
            Self::PageOffset(_) => "page_offset",
        }
    }

    /// Page number and offset selectors cannot be continued with a token
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::PageNumber(_) | Self::PageOffset(_))
    }

    /// The token, if this is a token selector
    pub fn token(&self) -> Option<&ContinuationToken> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }
}

impl From<ContinuationToken> for PageSelector {
    fn from(token: ContinuationToken) -> Self {
        Self::Token(token)
    }
}

impl From<Option<ContinuationToken>> for PageSelector {
    fn from(token: Option<ContinuationToken>) -> Self {
        token.map_or(Self::None, Self::Token)
    }
}

impl From<PageNumber> for PageSelector {
    fn from(number: PageNumber) -> Self {
        Self::PageNumber(number)
    }
}

impl From<PageOffset> for PageSelector {
    fn from(offset: PageOffset) -> Self {
        Self::PageOffset(offset)
    }
}
