//! User-related custom validators.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::constants::ERR_INVALID_ROLE;
use crate::models::Role;

lazy_static! {
    static ref ACCOUNT_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^1[3-9]\d{9}$").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Custom validator for role field.
/// Validates that the role is one of the five business roles.
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<Role>()
        .map(|_| ())
        .map_err(|_| error("invalid_role", ERR_INVALID_ROLE))
}

/// Account: 3-20 letters, digits or underscores.
pub fn validate_account_format(account: &str) -> Result<(), ValidationError> {
    if ACCOUNT_RE.is_match(account) {
        Ok(())
    } else {
        Err(error(
            "invalid_account",
            "Account must be 3-20 letters, digits or underscores",
        ))
    }
}

/// Mainland mobile number: 11 digits starting with 13-19.
pub fn validate_phone_format(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(error("invalid_phone", "Invalid phone number format"))
    }
}

pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(error("invalid_email", "Invalid email format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_role() {
        assert!(validate_role("管理员").is_ok());
        assert!(validate_role("会计").is_ok());
        assert!(validate_role("admin").is_err());
        assert!(validate_role("").is_err());
    }

    #[test]
    fn test_validate_account_format() {
        assert!(validate_account_format("zhang_san01").is_ok());
        assert!(validate_account_format("ab").is_err());
        assert!(validate_account_format("has space").is_err());
        assert!(validate_account_format("a_very_long_account_name").is_err());
        assert!(validate_account_format("张三").is_err());
    }

    #[test]
    fn test_validate_phone_format() {
        assert!(validate_phone_format("13812345678").is_ok());
        assert!(validate_phone_format("19912345678").is_ok());
        assert!(validate_phone_format("12812345678").is_err());
        assert!(validate_phone_format("1381234567").is_err());
        assert!(validate_phone_format("138123456789").is_err());
    }

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("ops@pd-logistics.cn").is_ok());
        assert!(validate_email_format("first.last+tag@mail.example.com").is_ok());
        assert!(validate_email_format("no-at-sign").is_err());
        assert!(validate_email_format("x@y").is_err());
    }
}
