//! JWT Claims model.

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub name: String,
    pub role: String, // role label, e.g. 管理员
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> i64 {
        self.sub.parse().unwrap_or_default()
    }

    /// Unknown labels are treated as the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Accountant)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    pub fn is_manager(&self) -> bool {
        self.role().is_manager()
    }

    pub fn is_finance(&self) -> bool {
        self.role().is_finance()
    }

    /// Check if the claims belong to the specified user ID
    pub fn is_user(&self, user_id: i64) -> bool {
        self.user_id() == user_id
    }
}
