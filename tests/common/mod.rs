#![allow(dead_code)]

use std::time::Duration;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use pd_logistics_api::models::Role;
use pd_logistics_api::services::auth_service::generate_token;
use pd_logistics_api::AppState;

/// Pool pointing at a port nothing listens on; it never connects until a
/// query runs, and then fails fast.
pub fn unreachable_pool() -> MySqlPool {
    MySqlPoolOptions::new()
        .acquire_timeout(Duration::from_millis(300))
        .connect_lazy("mysql://pd:pd@127.0.0.1:1/pd")
        .expect("lazy pool")
}

pub fn state() -> AppState {
    AppState::new(unreachable_pool())
}

pub fn token_for(role: Role) -> String {
    generate_token(7, "测试用户", role).expect("token")
}

pub fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().expect("socket addr")
}

/// Status of a request, including errors raised by middleware.
pub async fn status_of<S, R, B>(app: &S, req: R) -> StatusCode
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(e) => e.as_response_error().status_code(),
    }
}
