//! Pager configuration
//!
//! Loaded from YAML (or JSON) by the command-line tools:
//!
//! ```yaml
//! page_size: 10
//! max_page_size: 100
//! ordering:
//!   - timestamp: asc
//!   - id: asc
//! params:
//!   continue: continue
//!   page: page
//!   offset: offset
//!   limit: limit
//! ```

use crate::error::{Error, Result};
use crate::ordering::OrderingSpec;
use crate::pager::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// PagerConfig
// ============================================================================

/// Paging defaults and request parameter names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Page size when a request gives none
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Requested page sizes are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Ordering installed on every pager
    #[serde(default)]
    pub ordering: OrderingSpec,

    /// Request parameter names
    #[serde(default)]
    pub params: ParamNames,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    100
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            ordering: OrderingSpec::default(),
            params: ParamNames::default(),
        }
    }
}

impl PagerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are JSON, anything else YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read pager config '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Check limits and parameter names
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size < 1 {
            return Err(Error::config("max_page_size must be at least 1"));
        }
        if self.page_size > self.max_page_size {
            return Err(Error::config(format!(
                "page_size ({}) exceeds max_page_size ({})",
                self.page_size, self.max_page_size
            )));
        }
        self.params.validate()
    }

    /// Clamp a requested page size
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        requested.min(self.max_page_size)
    }
}

// ============================================================================
// ParamNames
// ============================================================================

/// Names of the request parameters that select a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamNames {
    /// Continuation token
    #[serde(rename = "continue", default = "default_continue")]
    pub continue_token: String,

    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: String,

    /// 0-based record offset
    #[serde(default = "default_offset")]
    pub offset: String,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: String,
}

fn default_continue() -> String {
    "continue".to_string()
}

fn default_page() -> String {
    "page".to_string()
}

fn default_offset() -> String {
    "offset".to_string()
}

fn default_limit() -> String {
    "limit".to_string()
}

impl Default for ParamNames {
    fn default() -> Self {
        Self {
            continue_token: default_continue(),
            page: default_page(),
            offset: default_offset(),
            limit: default_limit(),
        }
    }
}

impl ParamNames {
    fn validate(&self) -> Result<()> {
        let names = [
            &self.continue_token,
            &self.page,
            &self.offset,
            &self.limit,
        ];

        if names.iter().any(|name| name.is_empty()) {
            return Err(Error::config("Request parameter names cannot be empty"));
        }
        for (i, name) in names.iter().enumerate() {
            if names[i + 1..].contains(name) {
                return Err(Error::config(format!(
                    "Request parameter name '{name}' is used twice"
                )));
            }
        }
        Ok(())
    }
}
