//! Image storage for delivery orders, contracts and payment receipts.
//!
//! Files live under `CONFIG.upload_dir/<category>/` and are recorded in the
//! database as `/uploads/<category>/<file>`. Only paths in that form are ever
//! read or deleted.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use log::{debug, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::constants::{
    ERR_FAILED_PROCESS_UPLOAD, ERR_FAILED_READ_FILE, ERR_FAILED_SAVE_FILE,
    ERR_FORM_FIELD_TOO_LARGE, ERR_IMAGE_FILE_MISSING, ERR_INVALID_FORM_FIELD, ERR_NO_IMAGE,
};
use crate::errors::ApiError;
use crate::validators::{
    content_type_for_path, extension_for_content_type, validate_image_content_type,
    validate_upload_size,
};

const STORED_PREFIX: &str = "/uploads/";
const MAX_FORM_FIELD_BYTES: usize = 64 * 1024;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub const DELIVERY_ORDERS: &str = "delivery_orders";
pub const CONTRACTS: &str = "contracts";
pub const RECEIPTS: &str = "receipts";

/// Text fields of a multipart form and the stored path of its image.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub image: Option<String>,
}

impl UploadForm {
    /// Non-blank text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Non-blank text fields as a JSON object, ready for a request model.
    /// Fields named in `numeric` are sent as numbers when they parse as one.
    pub fn fields_as_json(&self, numeric: &[&str]) -> Value {
        let mut object = Map::new();
        for name in self.fields.keys() {
            let Some(raw) = self.field(name) else {
                continue;
            };
            let value = match raw.parse::<i64>() {
                Ok(n) if numeric.contains(&name.as_str()) => Value::from(n),
                _ => Value::from(raw),
            };
            object.insert(name.clone(), value);
        }
        Value::Object(object)
    }
}

/// Image bytes ready to be served.
#[derive(Debug)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct FileService {
    upload_dir: PathBuf,
}

impl FileService {
    pub fn new() -> Self {
        Self {
            upload_dir: PathBuf::from(&CONFIG.upload_dir),
        }
    }

    pub fn with_upload_dir(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    /// Reads a whole multipart form. The `image` field is saved under
    /// `category`; every other field is kept as text. A failure after the
    /// image was saved removes it again.
    pub async fn read_form(
        &self,
        payload: &mut Multipart,
        category: &str,
        prefix: &str,
    ) -> Result<UploadForm, ApiError> {
        let mut form = UploadForm::default();
        if let Err(e) = self.read_fields(payload, category, prefix, &mut form).await {
            if let Some(saved) = form.image.take() {
                self.delete_file(&saved);
            }
            return Err(e);
        }
        Ok(form)
    }

    async fn read_fields(
        &self,
        payload: &mut Multipart,
        category: &str,
        prefix: &str,
        form: &mut UploadForm,
    ) -> Result<(), ApiError> {
        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| {
                warn!("Failed to process multipart field: {}", e);
                ApiError::BadRequest(ERR_FAILED_PROCESS_UPLOAD.to_string())
            })?;

            let name = field
                .content_disposition()
                .and_then(|cd| cd.get_name())
                .unwrap_or("")
                .to_string();

            if name == IMAGE_FIELD {
                if form.image.is_none() {
                    form.image = Some(self.save_image(&mut field, category, prefix).await?);
                }
            } else if !name.is_empty() {
                let value = read_text(&mut field).await?;
                form.fields.insert(name, value);
            }
        }
        Ok(())
    }

    /// Streams one image field to disk and returns its stored path.
    async fn save_image(
        &self,
        field: &mut Field,
        category: &str,
        prefix: &str,
    ) -> Result<String, ApiError> {
        let content_type = field.content_type().map(|ct| ct.to_string());
        validate_image_content_type(content_type.as_deref())?;

        let extension = extension_for_content_type(content_type.as_deref());
        let filename = format!(
            "{}_{}.{}",
            safe_file_stem(prefix),
            Uuid::new_v4().simple(),
            extension
        );

        let dir = self.upload_dir.join(category);
        std::fs::create_dir_all(&dir).map_err(|e| {
            warn!("Failed to create upload directory {}: {}", dir.display(), e);
            ApiError::InternalServerError(ERR_FAILED_SAVE_FILE.to_string())
        })?;

        let filepath = dir.join(&filename);
        let mut file = std::fs::File::create(&filepath).map_err(|e| {
            warn!("Failed to create file: {}", e);
            ApiError::InternalServerError(ERR_FAILED_SAVE_FILE.to_string())
        })?;

        let mut total_size: usize = 0;
        while let Some(chunk) = field.next().await {
            let written = chunk
                .map_err(|e| {
                    warn!("Failed to read chunk: {}", e);
                    ApiError::BadRequest(ERR_FAILED_READ_FILE.to_string())
                })
                .and_then(|data| {
                    total_size += data.len();
                    validate_upload_size(total_size)?;
                    file.write_all(&data).map_err(|e| {
                        warn!("Failed to write file: {}", e);
                        ApiError::InternalServerError(ERR_FAILED_SAVE_FILE.to_string())
                    })
                });

            if let Err(e) = written {
                let _ = std::fs::remove_file(&filepath);
                return Err(e);
            }
        }

        debug!("Stored {} bytes at {}", total_size, filepath.display());
        Ok(format!("{}{}/{}", STORED_PREFIX, category, filename))
    }

    /// Loads a stored image. Records without an image and files that have
    /// gone missing are both `NotFound`, with different messages.
    pub fn read_image(&self, stored: Option<&str>) -> Result<StoredImage, ApiError> {
        let stored = stored
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::NotFound(ERR_NO_IMAGE.to_string()))?;

        let path = self
            .resolve(stored)
            .filter(|p| p.is_file())
            .ok_or_else(|| {
                debug!("Stored image {} is not on disk", stored);
                ApiError::NotFound(ERR_IMAGE_FILE_MISSING.to_string())
            })?;

        let bytes = std::fs::read(&path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            ApiError::InternalServerError(ERR_FAILED_READ_FILE.to_string())
        })?;

        Ok(StoredImage {
            bytes,
            content_type: content_type_for_path(stored),
        })
    }

    /// Removes a stored image. Unknown paths and missing files are ignored.
    pub fn delete_file(&self, stored: &str) {
        let Some(path) = self.resolve(stored) else {
            return;
        };
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to delete {}: {}", path.display(), e);
            }
        }
    }

    /// Maps `/uploads/<relative>` into the upload directory. Anything else,
    /// including `..` segments, maps to nothing.
    fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let relative = Path::new(stored.strip_prefix(STORED_PREFIX)?);
        let mut components = relative.components().peekable();
        components.peek()?;
        if !components.all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.upload_dir.join(relative))
    }
}

impl Default for FileService {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_text(field: &mut Field) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| {
            warn!("Failed to read form field: {}", e);
            ApiError::BadRequest(ERR_FAILED_PROCESS_UPLOAD.to_string())
        })?;
        if bytes.len() + data.len() > MAX_FORM_FIELD_BYTES {
            return Err(ApiError::BadRequest(ERR_FORM_FIELD_TOO_LARGE.to_string()));
        }
        bytes.extend_from_slice(&data);
    }
    String::from_utf8(bytes).map_err(|_| ApiError::BadRequest(ERR_INVALID_FORM_FIELD.to_string()))
}

/// Keeps word characters and `-`; everything else becomes `_`.
fn safe_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pd-files-{}", Uuid::new_v4().simple()))
    }

    #[test]
    fn test_resolve_stays_inside_upload_dir() {
        let files = FileService::with_upload_dir(PathBuf::from("/srv/pd"));

        assert_eq!(
            files.resolve("/uploads/receipts/a.jpg"),
            Some(PathBuf::from("/srv/pd/receipts/a.jpg"))
        );
        assert_eq!(files.resolve("/uploads/../etc/passwd"), None);
        assert_eq!(files.resolve("/uploads//etc/passwd"), None);
        assert_eq!(files.resolve("/etc/passwd"), None);
        assert_eq!(files.resolve("/uploads/"), None);
    }

    #[test]
    fn test_read_and_delete_stored_image() {
        let dir = scratch_dir();
        std::fs::create_dir_all(dir.join(CONTRACTS)).unwrap();
        std::fs::write(dir.join(CONTRACTS).join("HT-01.png"), b"png-bytes").unwrap();
        let files = FileService::with_upload_dir(dir.clone());

        let image = files.read_image(Some("/uploads/contracts/HT-01.png")).unwrap();
        assert_eq!(image.bytes, b"png-bytes");
        assert_eq!(image.content_type, "image/png");

        files.delete_file("/uploads/contracts/HT-01.png");
        assert!(!dir.join(CONTRACTS).join("HT-01.png").exists());
        files.delete_file("/uploads/contracts/HT-01.png");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_images_are_not_found() {
        let files = FileService::with_upload_dir(scratch_dir());

        match files.read_image(None) {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, ERR_NO_IMAGE),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(files.read_image(Some("  ")), Err(ApiError::NotFound(_))));
        match files.read_image(Some("/uploads/receipts/gone.jpg")) {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, ERR_IMAGE_FILE_MISSING),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            files.read_image(Some("/var/data/legacy.jpg")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_form_fields_as_json() {
        let mut form = UploadForm::default();
        form.fields.insert("target_factory_id".into(), "3".into());
        form.fields.insert("driver_phone".into(), "13800000000".into());
        form.fields.insert("quantity".into(), "32.5".into());
        form.fields.insert("warehouse".into(), "  ".into());

        let json = form.fields_as_json(&["target_factory_id"]);
        assert_eq!(json["target_factory_id"], 3);
        assert_eq!(json["driver_phone"], "13800000000");
        assert_eq!(json["quantity"], "32.5");
        assert!(json.get("warehouse").is_none());
        assert_eq!(form.field("warehouse"), None);
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("豫A 123/45"), "豫A_123_45");
        assert_eq!(safe_file_stem("HT-2025_01"), "HT-2025_01");
    }
}
