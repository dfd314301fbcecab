//! Authentication request models.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for user login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Login account
    #[validate(length(min = 1, message = "Account is required"))]
    #[schema(example = "zhangsan")]
    pub account: String,
    /// User's password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}
