//! User-related response models.

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Role, User, UserStatus};

/// User data returned in API responses (without the password hash)
#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    #[schema(example = "张三")]
    pub name: String,
    #[schema(example = "zhangsan")]
    pub account: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: UserStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role(),
            status: user.status(),
            name: user.name,
            account: user.account,
            phone: user.phone,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: i64,
    pub name: String,
    pub account: String,
    pub role: Role,
}

/// Payload of a successful login or token refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub uid: i64,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: LoginUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleInfo {
    pub code: Role,
    pub name: String,
    pub description: String,
    pub level: u8,
}

impl From<Role> for RoleInfo {
    fn from(role: Role) -> Self {
        Self {
            code: role,
            name: role.as_str().to_string(),
            description: role.description().to_string(),
            level: role.level(),
        }
    }
}
