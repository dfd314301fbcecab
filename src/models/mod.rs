//! Data models organized by type.

pub mod balance;
pub mod claims;
pub mod contract;
pub mod customer;
pub mod delivery;
pub mod requests;
pub mod responses;
pub mod user;
pub mod weighbill;

pub use balance::*;
pub use claims::*;
pub use contract::*;
pub use customer::*;
pub use delivery::*;
pub use requests::*;
pub use responses::*;
pub use user::*;
pub use weighbill::*;
