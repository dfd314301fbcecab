//! JWT Authentication middleware for protected routes.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;
use std::rc::Rc;

use crate::constants::{ERR_INVALID_AUTH_HEADER, ERR_INVALID_TOKEN, ERR_TOKEN_REVOKED};
use crate::errors::ApiError;
use crate::services::auth_service::decode_token;
use crate::services::TokenBlacklist;

/// JWT Authentication middleware.
///
/// This middleware validates JWT tokens from the Authorization header,
/// checks if the token has been blacklisted (logged out), and adds
/// the raw token and the decoded claims to the request extensions.
pub struct AuthMiddleware {
    blacklist: TokenBlacklist,
}

impl AuthMiddleware {
    pub fn new(blacklist: TokenBlacklist) -> Self {
        Self { blacklist }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            blacklist: self.blacklist.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    blacklist: TokenBlacklist,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let blacklist = self.blacklist.clone();

        Box::pin(async move {
            let token = match req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
            {
                Some(token) if !token.trim().is_empty() => token.trim().to_string(),
                _ => {
                    return Err(ApiError::Unauthorized(ERR_INVALID_AUTH_HEADER.to_string()).into());
                }
            };

            // Logged out tokens stay revoked until they expire
            if blacklist.is_blacklisted(&token) {
                debug!("Rejected revoked token on {}", req.path());
                return Err(ApiError::Unauthorized(ERR_TOKEN_REVOKED.to_string()).into());
            }

            let claims = decode_token(&token)
                .map_err(|_| ApiError::Unauthorized(ERR_INVALID_TOKEN.to_string()))?;

            req.extensions_mut().insert(token);
            req.extensions_mut().insert(claims);

            service.call(req).await
        })
    }
}
