//! Authentication handlers for login, logout and token refresh.

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use validator::Validate;

use crate::constants::{MSG_LOGIN_SUCCESS, MSG_LOGOUT_SUCCESS, MSG_TOKEN_REFRESHED};
use crate::errors::ApiError;
use crate::middleware::{require_auth, RequestExt};
use crate::models::{ApiResponse, LoginRequest, LoginResponse};
use crate::services::{AuthService, TokenBlacklist};
use crate::validators::validation_errors_to_api_error;

/// Authenticate with account and password and get a JWT token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Wrong account or password", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account frozen", body = crate::errors::ErrorResponse)
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let response = auth_service.login(body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_LOGIN_SUCCESS, response)))
}

/// Logout the current user
///
/// This endpoint invalidates the current JWT token by adding it to a server-side
/// blacklist. The token will remain blacklisted until its natural expiration time.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "Invalid or missing token", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    req: HttpRequest,
    token_blacklist: web::Data<TokenBlacklist>,
) -> Result<HttpResponse, ApiError> {
    if let (Some(claims), Some(token)) = (req.get_claims(), req.bearer_token()) {
        token_blacklist.blacklist_token(&token, claims.exp).await;
        info!("User {} logged out successfully", claims.sub);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_LOGOUT_SUCCESS)))
}

/// Exchange a valid token for a fresh one; the old token is revoked
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    responses(
        (status = 200, description = "New token issued", body = LoginResponse),
        (status = 401, description = "Invalid or missing token", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account frozen", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn refresh_token(
    auth_service: web::Data<AuthService>,
    token_blacklist: web::Data<TokenBlacklist>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    let response = auth_service.refresh(&claims).await?;

    if let Some(token) = req.bearer_token() {
        token_blacklist.blacklist_token(&token, claims.exp).await;
    }

    info!("User {} refreshed their token", claims.sub);
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_TOKEN_REFRESHED, response)))
}
