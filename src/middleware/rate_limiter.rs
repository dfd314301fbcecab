//! Per-peer rate limit for the `/api/v1/auth` scope.

use actix_governor::governor::clock::QuantaInstant;
use actix_governor::governor::middleware::NoOpMiddleware;
use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};

/// One request is replenished every this many seconds.
pub const AUTH_SECONDS_PER_REQUEST: u64 = 6;
/// Requests a single peer may send back to back.
pub const AUTH_BURST_SIZE: u32 = 5;

pub type AuthGovernorConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// Limiter for login, logout and refresh, keyed on the peer IP.
///
/// ```ignore
/// let config = create_auth_rate_limiter_config();
/// web::scope("/auth").wrap(Governor::new(&config))
/// ```
pub fn create_auth_rate_limiter_config() -> AuthGovernorConfig {
    build_config(AUTH_SECONDS_PER_REQUEST, AUTH_BURST_SIZE)
}

fn build_config(seconds_per_request: u64, burst: u32) -> AuthGovernorConfig {
    GovernorConfigBuilder::default()
        .seconds_per_request(seconds_per_request.max(1))
        .burst_size(burst.max(1))
        .finish()
        .expect("non-zero period and burst always build a governor config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_clamped() {
        let _ = build_config(0, 0);
        let _ = create_auth_rate_limiter_config();
    }
}
