//! Log sanitization utilities for masking sensitive data.
//!
//! Accounts, phone numbers and person names are masked before they reach the
//! log output. Masking works on characters, so Chinese names are handled.

/// Mask an account name for safe logging.
///
/// Shows only the first 3 characters followed by asterisks.
///
/// # Examples
/// ```ignore
/// assert_eq!(mask_account("zhangsan"), "zha***");
/// assert_eq!(mask_account("ab"), "ab***");
/// ```
pub fn mask_account(account: &str) -> String {
    let visible: String = account.chars().take(3).collect();
    format!("{}***", visible)
}

/// Mask a phone number, keeping the first 3 and last 4 digits.
///
/// # Examples
/// ```ignore
/// assert_eq!(mask_phone("13812345678"), "138****5678");
/// ```
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 8 {
        return mask_account(phone);
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// Mask a person's name, keeping only the first character.
pub fn mask_name(name: &str) -> String {
    match name.chars().next() {
        Some(first) => format!("{}**", first),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_account() {
        assert_eq!(mask_account("zhangsan"), "zha***");
        assert_eq!(mask_account("ab"), "ab***");
        assert_eq!(mask_account(""), "***");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("13812345678"), "138****5678");
        assert_eq!(mask_phone("12345"), "123***");
    }

    #[test]
    fn test_mask_name_multibyte() {
        assert_eq!(mask_name("张三丰"), "张**");
        assert_eq!(mask_name(""), "");
    }
}
