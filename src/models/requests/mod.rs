//! Request models for API endpoints.

pub mod auth;
pub mod balance;
pub mod contract;
pub mod customer;
pub mod delivery;
pub mod pagination;
pub mod user;
pub mod weighbill;

pub use auth::*;
pub use balance::*;
pub use contract::*;
pub use customer::*;
pub use delivery::*;
pub use pagination::*;
pub use user::*;
pub use weighbill::*;
