//! Handlers for the current user's profile and for user administration.

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use validator::Validate;

use crate::constants::{
    ERR_CANNOT_DELETE_SELF, ERR_ONLY_ADMINS_DELETE, MSG_NOTHING_TO_UPDATE, MSG_PASSWORD_CHANGED,
    MSG_PASSWORD_RESET, MSG_ROLES_LISTED, MSG_USERS_LISTED, MSG_USER_CREATED, MSG_USER_DELETED,
    MSG_USER_FOUND, MSG_USER_FROZEN, MSG_USER_PROFILE_RETRIEVED, MSG_USER_UNFROZEN,
    MSG_USER_UPDATED,
};
use crate::errors::ApiError;
use crate::middleware::{prevent_self_action, require_admin, require_auth, require_manager};
use crate::models::{
    ApiResponse, ChangePasswordRequest, CreateUserRequest, ResetPasswordRequest, RoleInfo,
    UpdateProfileRequest, UpdateUserRequest, UserListQuery, UserResponse,
};
use crate::services::UserService;
use crate::validators::validation_errors_to_api_error;

/// Get the currently authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Current user",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    debug!("Fetching current user with id: {}", claims.sub);

    let user = user_service.get_user(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_PROFILE_RETRIEVED, user)))
}

/// Update name, phone or email of the current user
///
/// The role cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/v1/me",
    tag = "Current user",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "Phone already in use", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_current_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let body = body.into_inner();
    if body.is_empty() {
        return Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_NOTHING_TO_UPDATE)));
    }

    let user = user_service.update_profile(claims.user_id(), body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_UPDATED, user)))
}

/// Change the current user's password
///
/// Requires the current password.
#[utoipa::path(
    put,
    path = "/api/v1/me/password",
    tag = "Current user",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Validation error or wrong current password", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn change_own_password(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    user_service
        .change_password(claims.user_id(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_PASSWORD_CHANGED)))
}

/// Create a user
///
/// Administrators create any role; regional managers only roles below their own.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 403, description = "Role may not be created by the caller", body = crate::errors::ErrorResponse),
        (status = 409, description = "Account or phone already exists", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let user = user_service.create_user(&claims, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_USER_CREATED, user)))
}

/// List users with paging and filters (administrators and regional managers)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("role" = Option<String>, Query, description = "Filter by role label"),
        ("keyword" = Option<String>, Query, description = "Search by name or account")
    ),
    responses(
        (status = 200, description = "Page of users as {total, page, size, pages, list}"),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;

    let page = user_service.list_users(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USERS_LISTED, page)))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_FOUND, user)))
}

/// Update a user
///
/// Administrators edit anyone; regional managers edit users below them.
/// Nobody changes their own role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or own role change", body = crate::errors::ErrorResponse),
        (status = 403, description = "No permission", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let body = body.into_inner();
    if body.is_empty() {
        return Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_NOTHING_TO_UPDATE)));
    }

    let user = user_service
        .update_user(&claims, path.into_inner(), body)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_UPDATED, user)))
}

/// Delete a user (administrators only, soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 400, description = "Cannot delete yourself", body = crate::errors::ErrorResponse),
        (status = 403, description = "Administrator role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let claims = require_auth(&req)?;
    require_admin(&claims, ERR_ONLY_ADMINS_DELETE)?;
    prevent_self_action(&claims, user_id, ERR_CANNOT_DELETE_SELF)?;

    user_service.delete_user(&claims, user_id).await?;

    info!("Admin {} deleted user {}", claims.sub, user_id);
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_USER_DELETED)))
}

/// Reset another user's password with the administrator key
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/reset-password",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 403, description = "Manager role or admin key required", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_password(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    body: web::Json<ResetPasswordRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    user_service
        .reset_password(&claims, path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_PASSWORD_RESET)))
}

/// Freeze an account so it can no longer log in
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/freeze",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User frozen"),
        (status = 400, description = "Already frozen or own account", body = crate::errors::ErrorResponse),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn freeze_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;

    user_service.set_frozen(&claims, path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_USER_FROZEN)))
}

/// Unfreeze an account
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/unfreeze",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User unfrozen"),
        (status = 400, description = "Account is not frozen", body = crate::errors::ErrorResponse),
        (status = 403, description = "Manager role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unfreeze_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_manager(&claims)?;

    user_service.set_frozen(&claims, path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_USER_UNFROZEN)))
}

/// The five roles with their levels
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "Users",
    responses(
        (status = 200, description = "Roles", body = [RoleInfo])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_roles(user_service: web::Data<UserService>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(MSG_ROLES_LISTED, user_service.roles()))
}
