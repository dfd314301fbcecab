//! Authentication and authorization helper functions.
//!
//! These helpers reduce boilerplate in handlers by providing common patterns for:
//! - Extracting claims from authenticated requests
//! - Requiring a role group (administrators, managers, finance)
//! - Preventing self-targeted actions

use actix_web::HttpRequest;
use log::warn;

use crate::constants::{ERR_AUTH_REQUIRED, ERR_FINANCE_REQUIRED, ERR_MANAGER_REQUIRED};
use crate::errors::ApiError;
use crate::models::Claims;

use super::RequestExt;

/// Extract claims from request or return Unauthorized error.
///
/// Use this at the start of any handler that requires authentication.
///
/// # Example
/// ```ignore
/// let claims = require_auth(&req)?;
/// ```
pub fn require_auth(req: &HttpRequest) -> Result<Claims, ApiError> {
    req.get_claims().ok_or_else(|| {
        warn!("Failed to get claims from request");
        ApiError::Unauthorized(ERR_AUTH_REQUIRED.to_string())
    })
}

/// Require the administrator role or return Forbidden.
///
/// # Example
/// ```ignore
/// let claims = require_auth(&req)?;
/// require_admin(&claims, ERR_ONLY_ADMINS_DELETE)?;
/// ```
pub fn require_admin(claims: &Claims, action_msg: &str) -> Result<(), ApiError> {
    if !claims.is_admin() {
        warn!("Non-admin user {} attempted admin action", claims.sub);
        return Err(ApiError::Forbidden(action_msg.to_string()));
    }
    Ok(())
}

/// Require an administrator or regional manager.
pub fn require_manager(claims: &Claims) -> Result<(), ApiError> {
    if !claims.is_manager() {
        warn!(
            "User {} (role: {}) attempted a manager action",
            claims.sub, claims.role
        );
        return Err(ApiError::Forbidden(ERR_MANAGER_REQUIRED.to_string()));
    }
    Ok(())
}

/// Require one of the roles that handle money.
pub fn require_finance(claims: &Claims) -> Result<(), ApiError> {
    if !claims.is_finance() {
        warn!(
            "User {} (role: {}) attempted a finance action",
            claims.sub, claims.role
        );
        return Err(ApiError::Forbidden(ERR_FINANCE_REQUIRED.to_string()));
    }
    Ok(())
}

/// Prevent self-targeted actions (e.g., an administrator deleting themselves).
///
/// Returns a BadRequest error if the user is attempting an action on themselves.
pub fn prevent_self_action(
    claims: &Claims,
    target_user_id: i64,
    self_action_msg: &str,
) -> Result<(), ApiError> {
    if claims.is_user(target_user_id) {
        warn!(
            "User {} attempted self-targeted action: {}",
            claims.sub, self_action_msg
        );
        return Err(ApiError::BadRequest(self_action_msg.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn claims(id: i64, role: Role) -> Claims {
        Claims {
            sub: id.to_string(),
            name: "测试".to_string(),
            role: role.as_str().to_string(),
            jti: "jti".to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_role_groups() {
        assert!(require_admin(&claims(1, Role::Admin), "x").is_ok());
        assert!(matches!(
            require_admin(&claims(1, Role::RegionalManager), "x"),
            Err(ApiError::Forbidden(_))
        ));

        assert!(require_manager(&claims(1, Role::RegionalManager)).is_ok());
        assert!(require_manager(&claims(1, Role::Finance)).is_err());

        assert!(require_finance(&claims(1, Role::Accountant)).is_ok());
        assert!(require_finance(&claims(1, Role::Admin)).is_ok());
        assert!(require_finance(&claims(1, Role::WarehouseManager)).is_err());
    }

    #[test]
    fn test_prevent_self_action() {
        let me = claims(7, Role::Admin);
        assert!(matches!(
            prevent_self_action(&me, 7, "no"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(prevent_self_action(&me, 8, "no").is_ok());
    }
}
