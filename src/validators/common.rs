//! Common validation utilities and helpers.

use validator::ValidationErrors;

use crate::config::CONFIG;
use crate::constants::{ERR_FILE_TOO_LARGE, ERR_INVALID_FILE_TYPE};
use crate::errors::ApiError;

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/bmp"];

/// Convert validator errors to ApiError::ValidationError.
///
/// Messages of nested structs and list items are included.
///
/// # Example
/// ```ignore
/// body.validate().map_err(validation_errors_to_api_error)?;
/// ```
pub fn validation_errors_to_api_error(e: ValidationErrors) -> ApiError {
    ApiError::ValidationError(collect_messages(&e))
}

fn collect_messages(e: &ValidationErrors) -> Vec<String> {
    use validator::ValidationErrorsKind;

    let mut messages = Vec::new();
    for (field, kind) in e.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                messages.extend(errs.iter().map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                }));
            }
            ValidationErrorsKind::Struct(inner) => messages.extend(collect_messages(inner)),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    messages.extend(collect_messages(inner));
                }
            }
        }
    }
    messages
}

/// Splits a whitespace-separated keyword string into search tokens.
pub fn keyword_tokens(keywords: Option<&str>) -> Vec<String> {
    keywords
        .map(|k| k.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Accepts the photo formats scanners and phones produce.
pub fn validate_image_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    match content_type {
        Some(ct) if ALLOWED_IMAGE_TYPES.iter().any(|t| ct.starts_with(t)) => Ok(()),
        _ => Err(ApiError::BadRequest(ERR_INVALID_FILE_TYPE.to_string())),
    }
}

pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.starts_with("image/png") => "png",
        Some(ct) if ct.starts_with("image/bmp") => "bmp",
        _ => "jpg",
    }
}

/// Content type served for a stored image, from its extension.
pub fn content_type_for_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

pub fn validate_upload_size(size: usize) -> Result<(), ApiError> {
    if size > CONFIG.max_upload_bytes {
        return Err(ApiError::BadRequest(ERR_FILE_TOO_LARGE.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "name too short"))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    #[test]
    fn test_messages_fall_back_to_field_name() {
        let sample = Sample {
            name: "ab".to_string(),
            count: 0,
        };
        let err = validation_errors_to_api_error(sample.validate().unwrap_err());
        match err {
            ApiError::ValidationError(messages) => {
                assert!(messages.contains(&"name too short".to_string()));
                assert!(messages.contains(&"count is invalid".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_keyword_tokens() {
        assert_eq!(keyword_tokens(Some("  HT-01   金利 ")), vec!["HT-01", "金利"]);
        assert!(keyword_tokens(Some("   ")).is_empty());
        assert!(keyword_tokens(None).is_empty());
    }

    #[test]
    fn test_image_types() {
        assert!(validate_image_content_type(Some("image/png")).is_ok());
        assert!(validate_image_content_type(Some("image/jpeg; charset=binary")).is_ok());
        assert!(matches!(
            validate_image_content_type(Some("application/pdf")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(validate_image_content_type(None).is_err());

        assert_eq!(extension_for_content_type(Some("image/bmp")), "bmp");
        assert_eq!(extension_for_content_type(Some("image/jpg")), "jpg");
        assert_eq!(content_type_for_path("/uploads/a/b.PNG"), "image/png");
        assert_eq!(content_type_for_path("/uploads/a/b"), "image/jpeg");
    }
}
