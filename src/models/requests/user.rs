//! User-related request models.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::validators::{
    validate_account_format, validate_email_format, validate_phone_format, validate_role,
};

/// Request payload for creating a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    #[schema(example = "张三")]
    pub name: String,
    /// 3-20 letters, digits or underscores
    #[validate(custom(function = "validate_account_format"))]
    #[schema(example = "zhangsan")]
    pub account: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
    /// One of 管理员, 大区经理, 自营库管理, 财务, 会计
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "会计")]
    pub role: String,
    #[validate(custom(function = "validate_phone_format"))]
    #[schema(example = "13812345678")]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_email_format"))]
    #[schema(example = "zhangsan@example.com")]
    pub email: Option<String>,
}

/// Request payload for updating the current user's own profile
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone_format"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_email_format"))]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// Request payload for updating another user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
    #[validate(custom(function = "validate_phone_format"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_email_format"))]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// Request payload for changing password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Request payload for resetting another user's password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Admin key is required"))]
    pub admin_key: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    /// Filter by role label
    pub role: Option<String>,
    /// Matches name or account
    pub keyword: Option<String>,
}
