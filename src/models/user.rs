use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// User roles for role-based access control, stored by their business label.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
pub enum Role {
    #[serde(rename = "管理员")]
    Admin,
    #[serde(rename = "大区经理")]
    RegionalManager,
    #[serde(rename = "自营库管理")]
    WarehouseManager,
    #[serde(rename = "财务")]
    Finance,
    #[serde(rename = "会计")]
    Accountant,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::RegionalManager,
        Role::WarehouseManager,
        Role::Finance,
        Role::Accountant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "管理员",
            Role::RegionalManager => "大区经理",
            Role::WarehouseManager => "自营库管理",
            Role::Finance => "财务",
            Role::Accountant => "会计",
        }
    }

    /// Hierarchy level, higher means more privileges.
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::RegionalManager => 80,
            Role::WarehouseManager | Role::Finance => 60,
            Role::Accountant => 40,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "System administrator with all permissions",
            Role::RegionalManager => "Manages subordinate users and business data",
            Role::WarehouseManager => "Manages own warehouses and logistics",
            Role::Finance => "Handles payments and settlements",
            Role::Accountant => "Reviews financial data and settlements",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Administrators and regional managers.
    pub fn is_manager(&self) -> bool {
        self.level() >= Role::RegionalManager.level()
    }

    /// Roles allowed to generate balances and verify payments.
    pub fn is_finance(&self) -> bool {
        matches!(self, Role::Admin | Role::Finance | Role::Accountant)
    }

    /// Whether this role may create, edit or assign users of `target` role.
    ///
    /// Administrators manage everyone; regional managers only manage roles
    /// below their own level.
    pub fn can_manage(&self, target: Role) -> bool {
        match self {
            Role::Admin => true,
            Role::RegionalManager => target.level() < self.level(),
            _ => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// Account state stored in `pd_users.status`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Normal,
    Frozen,
    Deleted,
}

impl UserStatus {
    pub fn as_i8(&self) -> i8 {
        match self {
            UserStatus::Normal => 0,
            UserStatus::Frozen => 1,
            UserStatus::Deleted => 2,
        }
    }

    pub fn from_i8(v: i8) -> Self {
        match v {
            1 => UserStatus::Frozen,
            2 => UserStatus::Deleted,
            _ => UserStatus::Normal,
        }
    }
}

/// Row of `pd_users`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub account: String,
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: i8,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    /// Parsed role; rows are constrained by a CHECK so unknown labels fall back
    /// to the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Accountant)
    }

    pub fn status(&self) -> UserStatus {
        UserStatus::from_i8(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_label() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_as_label() {
        let json = serde_json::to_string(&Role::RegionalManager).unwrap();
        assert_eq!(json, "\"大区经理\"");
    }

    #[test]
    fn test_manager_cannot_manage_peers_or_admins() {
        assert!(Role::Admin.can_manage(Role::Admin));
        assert!(Role::RegionalManager.can_manage(Role::WarehouseManager));
        assert!(Role::RegionalManager.can_manage(Role::Accountant));
        assert!(!Role::RegionalManager.can_manage(Role::RegionalManager));
        assert!(!Role::RegionalManager.can_manage(Role::Admin));
        assert!(!Role::Finance.can_manage(Role::Accountant));
    }

    #[test]
    fn test_finance_roles() {
        assert!(Role::Admin.is_finance());
        assert!(Role::Finance.is_finance());
        assert!(Role::Accountant.is_finance());
        assert!(!Role::RegionalManager.is_finance());
        assert!(!Role::WarehouseManager.is_finance());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(UserStatus::from_i8(0), UserStatus::Normal);
        assert_eq!(UserStatus::from_i8(1), UserStatus::Frozen);
        assert_eq!(UserStatus::Deleted.as_i8(), 2);
    }
}
