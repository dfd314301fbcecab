//! Shared helpers that carry no business state.

pub mod log_sanitizer;
pub mod money;
pub mod text;

pub use log_sanitizer::*;
pub use money::*;
pub use text::*;
