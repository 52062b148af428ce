//! Fetch Context
//!
//! The paging/sort/filter state supplied by the calling grid component
//! for one fetch.

use crate::constants::DEFAULT_PER_PAGE;

/// Free-text or pattern filter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Plain substring filter
    Text(String),
    /// Regular-expression filter, sent with `search.regex = true`
    Regex(String),
}

impl Filter {
    /// The filter text as sent in `search.value`
    pub fn value(&self) -> &str {
        match self {
            Filter::Text(value) | Filter::Regex(value) => value,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Filter::Regex(_))
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Filter::Text(value.to_string())
    }
}

impl From<String> for Filter {
    fn from(value: String) -> Self {
        Filter::Text(value)
    }
}

/// One fetch worth of grid state
#[derive(Clone, Debug, PartialEq)]
pub struct FetchContext {
    /// 1-based page to load
    pub current_page: u64,
    /// Rows per page; `-1` requests all rows
    pub per_page: i64,
    pub filter: Option<Filter>,
    /// Key of the field to sort by
    pub sort_by: Option<String>,
    pub sort_desc: bool,
    /// Per-call override of the provider's configured URL
    pub api_url: Option<String>,
}

impl FetchContext {
    pub fn new(current_page: u64, per_page: i64) -> Self {
        Self {
            current_page,
            per_page,
            filter: None,
            sort_by: None,
            sort_desc: false,
            api_url: None,
        }
    }

    /// Set the free-text or pattern filter
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the sort field and direction
    pub fn sort(mut self, sort_by: impl Into<String>, sort_desc: bool) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_desc = sort_desc;
        self
    }

    /// Override the provider's configured URL for this call
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}
