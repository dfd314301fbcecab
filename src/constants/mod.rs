//! Application constants module.
//!
//! Centralizes error codes, error and success messages, pagination limits and
//! the business labels stored in the database.

pub mod error_codes;
pub mod errors;
pub mod labels;
pub mod messages;
pub mod pagination;

pub use error_codes::*;
pub use errors::*;
pub use labels::*;
pub use messages::*;
pub use pagination::*;
