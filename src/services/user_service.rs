//! User service: profile management, user administration and password changes.

use log::{debug, info, warn};

use crate::config::CONFIG;
use crate::constants::{
    ERR_ACCOUNT_EXISTS, ERR_CANNOT_CHANGE_OWN_ROLE, ERR_CANNOT_DELETE_SELF,
    ERR_CANNOT_FREEZE_SELF, ERR_INVALID_ADMIN_KEY, ERR_INVALID_ROLE,
    ERR_NO_PERMISSION_CREATE_USER, ERR_NO_PERMISSION_EDIT_USER, ERR_PHONE_EXISTS,
    ERR_STATUS_UNCHANGED, ERR_USER_NOT_FOUND, ERR_WRONG_PASSWORD,
};
use crate::errors::ApiError;
use crate::models::{
    ChangePasswordRequest, Claims, CreateUserRequest, Pagination, ResetPasswordRequest, Role,
    RoleInfo, UpdateProfileRequest, UpdateUserRequest, User, UserListQuery, UserPage,
    UserResponse, UserStatus,
};
use crate::repositories::user_repository::UserChanges;
use crate::repositories::UserRepository;
use crate::services::auth_service::{hash_password, verify_password};
use crate::utils::{mask_account, mask_phone};

pub struct UserService {
    repository: UserRepository,
}

impl UserService {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }

    /// Creates a user on behalf of `actor`.
    ///
    /// Administrators may create any role, regional managers only roles below
    /// their own.
    pub async fn create_user(
        &self,
        actor: &Claims,
        req: CreateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        let role = parse_role(&req.role)?;
        if !actor.role().can_manage(role) {
            warn!(
                "User {} ({}) may not create a user with role {}",
                actor.sub, actor.role, role
            );
            return Err(ApiError::Forbidden(ERR_NO_PERMISSION_CREATE_USER.to_string()));
        }

        let account = req.account.trim();
        if self.repository.account_exists(account).await? {
            warn!("Create user failed: account {} exists", mask_account(account));
            return Err(ApiError::Conflict(ERR_ACCOUNT_EXISTS.to_string()));
        }
        if let Some(phone) = req.phone.as_deref() {
            if self.repository.phone_in_use(phone, None).await? {
                warn!("Create user failed: phone {} in use", mask_phone(phone));
                return Err(ApiError::Conflict(ERR_PHONE_EXISTS.to_string()));
            }
        }

        let password_hash = hash_password(&req.password)?;
        let id = self
            .repository
            .insert(
                req.name.trim(),
                account,
                &password_hash,
                role.as_str(),
                req.phone.as_deref(),
                req.email.as_deref(),
            )
            .await?;

        info!("User {} created user {} with role {}", actor.sub, id, role);
        self.get_user(id).await
    }

    pub async fn list_users(&self, query: UserListQuery) -> Result<UserPage<UserResponse>, ApiError> {
        let pagination = Pagination::new(query.page, query.size);
        let (users, total) = self
            .repository
            .list(query.role.as_deref(), query.keyword.as_deref(), pagination)
            .await?;

        debug!("Listed {} of {} users", users.len(), total);

        Ok(UserPage {
            total,
            page: pagination.page,
            size: pagination.page_size,
            pages: pagination.total_pages(total),
            list: users.into_iter().map(UserResponse::from).collect(),
        })
    }

    pub async fn get_user(&self, id: i64) -> Result<UserResponse, ApiError> {
        Ok(self.find_user(id).await?.into())
    }

    /// Updates name, phone or email of the caller's own account.
    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, ApiError> {
        self.find_user(user_id).await?;
        if let Some(phone) = req.phone.as_deref() {
            self.ensure_phone_free(phone, user_id).await?;
        }

        self.repository
            .update(
                user_id,
                UserChanges {
                    name: req.name.map(|n| n.trim().to_string()),
                    role: None,
                    phone: req.phone,
                    email: req.email,
                },
            )
            .await?;

        info!("User {} updated their profile", user_id);
        self.get_user(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let user = self.find_user(user_id).await?;

        if !verify_password(&req.old_password, &user.password_hash)? {
            warn!("Password change failed: wrong current password for user {}", user_id);
            return Err(ApiError::BadRequest(ERR_WRONG_PASSWORD.to_string()));
        }

        let new_hash = hash_password(&req.new_password)?;
        self.repository.update_password(user_id, &new_hash).await?;

        info!("User {} changed their password", user_id);
        Ok(())
    }

    /// Edits another user. Nobody may change their own role, and a regional
    /// manager may neither edit nor promote beyond the roles below theirs.
    pub async fn update_user(
        &self,
        actor: &Claims,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        let target = self.find_user(id).await?;
        self.ensure_can_manage(actor, &target)?;

        let new_role = req.role.as_deref().map(parse_role).transpose()?;
        if let Some(role) = new_role {
            if actor.is_user(id) && role != target.role() {
                warn!("User {} attempted to change their own role", actor.sub);
                return Err(ApiError::BadRequest(ERR_CANNOT_CHANGE_OWN_ROLE.to_string()));
            }
            if !actor.role().can_manage(role) {
                warn!("User {} may not assign role {}", actor.sub, role);
                return Err(ApiError::Forbidden(ERR_NO_PERMISSION_EDIT_USER.to_string()));
            }
        }

        if let Some(phone) = req.phone.as_deref() {
            self.ensure_phone_free(phone, id).await?;
        }

        self.repository
            .update(
                id,
                UserChanges {
                    name: req.name.map(|n| n.trim().to_string()),
                    role: new_role.map(|r| r.as_str().to_string()),
                    phone: req.phone,
                    email: req.email,
                },
            )
            .await?;

        info!("User {} updated user {}", actor.sub, id);
        self.get_user(id).await
    }

    /// Soft delete: the row stays with status 2 and can no longer log in.
    pub async fn delete_user(&self, actor: &Claims, id: i64) -> Result<(), ApiError> {
        if actor.is_user(id) {
            warn!("User {} attempted to delete themselves", actor.sub);
            return Err(ApiError::BadRequest(ERR_CANNOT_DELETE_SELF.to_string()));
        }

        self.find_user(id).await?;
        self.repository.set_status(id, UserStatus::Deleted).await?;

        info!("User {} deleted user {}", actor.sub, id);
        Ok(())
    }

    pub async fn reset_password(
        &self,
        actor: &Claims,
        id: i64,
        req: ResetPasswordRequest,
    ) -> Result<(), ApiError> {
        if req.admin_key != CONFIG.admin_reset_key {
            warn!("User {} supplied a wrong admin key for password reset", actor.sub);
            return Err(ApiError::Forbidden(ERR_INVALID_ADMIN_KEY.to_string()));
        }

        self.find_user(id).await?;
        let new_hash = hash_password(&req.new_password)?;
        self.repository.update_password(id, &new_hash).await?;

        info!("User {} reset the password of user {}", actor.sub, id);
        Ok(())
    }

    /// Freezes or unfreezes an account. Setting the current status again is an error.
    pub async fn set_frozen(&self, actor: &Claims, id: i64, frozen: bool) -> Result<(), ApiError> {
        if frozen && actor.is_user(id) {
            warn!("User {} attempted to freeze themselves", actor.sub);
            return Err(ApiError::BadRequest(ERR_CANNOT_FREEZE_SELF.to_string()));
        }

        let target = self.find_user(id).await?;
        let status = if frozen {
            UserStatus::Frozen
        } else {
            UserStatus::Normal
        };
        if target.status() == status {
            return Err(ApiError::BadRequest(ERR_STATUS_UNCHANGED.to_string()));
        }

        self.repository.set_status(id, status).await?;
        info!(
            "User {} {} user {}",
            actor.sub,
            if frozen { "froze" } else { "unfroze" },
            id
        );
        Ok(())
    }

    pub fn roles(&self) -> Vec<RoleInfo> {
        Role::ALL.into_iter().map(RoleInfo::from).collect()
    }

    async fn find_user(&self, id: i64) -> Result<User, ApiError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            debug!("User {} not found", id);
            ApiError::NotFound(ERR_USER_NOT_FOUND.to_string())
        })
    }

    async fn ensure_phone_free(&self, phone: &str, owner_id: i64) -> Result<(), ApiError> {
        if self.repository.phone_in_use(phone, Some(owner_id)).await? {
            warn!("Phone {} already used by another user", mask_phone(phone));
            return Err(ApiError::Conflict(ERR_PHONE_EXISTS.to_string()));
        }
        Ok(())
    }

    fn ensure_can_manage(&self, actor: &Claims, target: &User) -> Result<(), ApiError> {
        if actor.is_admin() || actor.role().can_manage(target.role()) {
            return Ok(());
        }
        warn!(
            "User {} ({}) may not modify user {} ({})",
            actor.sub, actor.role, target.id, target.role
        );
        Err(ApiError::Forbidden(ERR_NO_PERMISSION_EDIT_USER.to_string()))
    }
}

fn parse_role(label: &str) -> Result<Role, ApiError> {
    label
        .parse::<Role>()
        .map_err(|_| ApiError::BadRequest(ERR_INVALID_ROLE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_rejects_unknown_labels() {
        assert_eq!(parse_role("财务").unwrap(), Role::Finance);
        assert!(matches!(parse_role("boss"), Err(ApiError::BadRequest(_))));
    }
}
