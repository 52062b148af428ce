//! Provider Constants
//!
//! Centralized paging and protocol defaults shared across the crate.

/// Component name reported by provider instances
pub const PROVIDER_NAME: &str = "ItemsProvider";

/// Draw counter sent with every query
pub const DRAW: u32 = 1;

/// Default page size
pub const DEFAULT_PER_PAGE: i64 = 15;

/// Page size meaning "all rows"
pub const ALL_ROWS: i64 = -1;

/// Default page length choices offered to the grid
pub const DEFAULT_PAGE_LENGTHS: [(i64, &str); 5] = [
    (15, "15"),
    (100, "100"),
    (500, "500"),
    (1000, "1000"),
    (ALL_ROWS, "All"),
];

/// Largest bracketed index the query-string parser will materialize
pub const MAX_PARSED_ARRAY_INDEX: usize = 1024;
