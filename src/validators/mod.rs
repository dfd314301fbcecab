//! Request validators.

pub mod business;
pub mod common;
pub mod user;

pub use business::*;
pub use common::*;
pub use user::*;
