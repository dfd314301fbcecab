//! Response models for API endpoints.

pub mod api;
pub mod pagination;
pub mod parse;
pub mod user;
pub mod weighbill;

pub use api::*;
pub use pagination::*;
pub use parse::*;
pub use user::*;
pub use weighbill::*;
