//! Authentication service for login, token issuing and password hashing.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::constants::{ERR_ACCOUNT_FROZEN, ERR_INVALID_CREDENTIALS, ERR_INVALID_TOKEN};
use crate::errors::ApiError;
use crate::models::{Claims, LoginRequest, LoginResponse, LoginUser, Role, User, UserStatus};
use crate::repositories::UserRepository;
use crate::utils::mask_account;

pub struct AuthService {
    repository: UserRepository,
}

impl AuthService {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }

    /// Checks credentials and issues a token.
    ///
    /// Unknown accounts and wrong passwords share one message. Deleted
    /// accounts are invisible to the lookup and report the same way.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let account = req.account.trim();
        let user = self
            .repository
            .find_by_account(account)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown account {}", mask_account(account));
                ApiError::Unauthorized(ERR_INVALID_CREDENTIALS.to_string())
            })?;

        if !verify_password(&req.password, &user.password_hash)? {
            warn!("Login failed: wrong password for {}", mask_account(account));
            return Err(ApiError::Unauthorized(ERR_INVALID_CREDENTIALS.to_string()));
        }

        if user.status() == UserStatus::Frozen {
            warn!("Login refused: account {} is frozen", mask_account(account));
            return Err(ApiError::Forbidden(ERR_ACCOUNT_FROZEN.to_string()));
        }

        let response = issue_token(&user, user.role())?;
        info!("User {} logged in", user.id);
        Ok(response)
    }

    /// New token for the user behind `claims`, carrying their current role.
    pub async fn refresh(&self, claims: &Claims) -> Result<LoginResponse, ApiError> {
        let user = self
            .repository
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ApiError::Unauthorized(ERR_INVALID_TOKEN.to_string()))?;

        reissue(&user)
    }
}

/// Token for a freshly loaded user row; the role comes from the row, not
/// from the token being refreshed.
fn reissue(user: &User) -> Result<LoginResponse, ApiError> {
    match user.status() {
        UserStatus::Frozen => Err(ApiError::Forbidden(ERR_ACCOUNT_FROZEN.to_string())),
        UserStatus::Deleted => Err(ApiError::Unauthorized(ERR_INVALID_TOKEN.to_string())),
        UserStatus::Normal => issue_token(user, user.role()),
    }
}

fn issue_token(user: &User, role: Role) -> Result<LoginResponse, ApiError> {
    let token = generate_token(user.id, &user.name, role)?;
    Ok(LoginResponse {
        uid: user.id,
        token,
        expires_in: CONFIG.token_ttl_secs(),
        user: LoginUser {
            id: user.id,
            name: user.name.clone(),
            account: user.account.clone(),
            role,
        },
    })
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    Ok(hash(password, DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    Ok(verify(password, hash)?)
}

/// Signs an HS256 token carrying the user id, name and role label.
pub fn generate_token(user_id: i64, name: &str, role: Role) -> Result<String, ApiError> {
    let now = Utc::now().timestamp() as usize;
    let ttl = usize::try_from(CONFIG.token_ttl_secs()).unwrap_or(0);
    let exp = now.saturating_add(ttl);

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        role: role.as_str().to_string(),
        jti: Uuid::new_v4().to_string(),
        exp,
        iat: now,
    };

    debug!("Generated token for user {} with role {}", user_id, role);

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(CONFIG.jwt_secret.as_bytes()),
    )?)
}

/// Decodes and validates a token's signature and expiry.
pub fn decode_token(token: &str) -> Result<Claims, ApiError> {
    Ok(decode::<Claims>(
        token,
        &DecodingKey::from_secret(CONFIG.jwt_secret.as_bytes()),
        &Validation::default(),
    )?
    .claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = generate_token(42, "张三", Role::Finance).unwrap();
        let claims = decode_token(&token).unwrap();

        assert_eq!(claims.user_id(), 42);
        assert_eq!(claims.name, "张三");
        assert_eq!(claims.role(), Role::Finance);
        assert_eq!(claims.exp - claims.iat, CONFIG.token_ttl_secs() as usize);
    }

    #[test]
    fn test_tokens_get_distinct_ids() {
        let a = decode_token(&generate_token(1, "a", Role::Admin).unwrap()).unwrap();
        let b = decode_token(&generate_token(1, "a", Role::Admin).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = generate_token(7, "b", Role::Accountant).unwrap();
        let tampered = format!("{}x", token);
        assert!(matches!(decode_token(&tampered), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_password_hash_verifies() {
        let hashed = hash("secret123", 4).unwrap();
        assert!(verify_password("secret123", &hashed).unwrap());
        assert!(!verify_password("secret124", &hashed).unwrap());
    }

    fn user_row(role: Role, status: UserStatus) -> User {
        User {
            id: 9,
            name: "李四".to_string(),
            account: "lisi".to_string(),
            password_hash: String::new(),
            role: role.as_str().to_string(),
            phone: None,
            email: None,
            status: status.as_i8(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_refresh_uses_role_stored_on_user() {
        let response = reissue(&user_row(Role::Finance, UserStatus::Normal)).unwrap();
        assert_eq!(response.user.role, Role::Finance);
        assert_eq!(decode_token(&response.token).unwrap().role(), Role::Finance);

        assert!(matches!(
            reissue(&user_row(Role::Admin, UserStatus::Frozen)),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            reissue(&user_row(Role::Admin, UserStatus::Deleted)),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
