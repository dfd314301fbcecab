//! Pagination constants for list endpoints.

/// Default number of items per page when not specified in the request.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive data retrieval.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number.
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Upper bound on rows returned by balance matching.
pub const MAX_MATCH_CANDIDATES: i64 = 10;
