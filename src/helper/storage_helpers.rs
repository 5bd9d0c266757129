use crate::config::Config;
use crate::models::db_operations::users_db_operations;
use crate::models::{MediaKind, MediaObject};
use actix_multipart::Multipart;
use actix_web::web::{self, BytesMut};
use chrono::Utc;
use futures_util::StreamExt;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Every object lives under this bucket directory of `MEDIA_PATH`.
pub const BUCKET: &str = "portfolio-media";
/// Upper bound for a plain text part of a multipart form.
pub const MAX_FIELD_BYTES: usize = 4 * 1024;
pub const MAX_FILES_PER_FORM: usize = 10;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid object path '{0}'.")]
    InvalidPath(String),
    #[error("Unsupported file type: '{0}'. Please upload one of the allowed types.")]
    UnsupportedType(String),
    #[error("File is too large. Maximum size is {0}MB.")]
    TooLarge(u64),
    #[error("File uploads are currently disabled. No MIME types are configured.")]
    UploadsDisabled,
    #[error("No file was uploaded.")]
    NoFile,
    #[error("Too many files in one upload. At most {0} are accepted.")]
    TooManyFiles(usize),
    #[error("Form field '{0}' is too long.")]
    FieldTooLarge(String),
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("An internal server configuration error occurred: {0}")]
    Misconfigured(String),
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Blocking task error: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl StorageError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidPath(_)
                | StorageError::UnsupportedType(_)
                | StorageError::TooLarge(_)
                | StorageError::UploadsDisabled
                | StorageError::NoFile
                | StorageError::TooManyFiles(_)
                | StorageError::FieldTooLarge(_)
                | StorageError::Multipart(_)
        )
    }
}

/// Maps an allowed MIME type to the extension stored objects get. Not
/// configurable: an allowlisted type without an entry here is a server error.
pub fn mime_to_safe_extension(mime_type: &str) -> Option<&'static str> {
    let map: BTreeMap<&str, &str> = [
        ("application/pdf", "pdf"),
        ("image/gif", "gif"),
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
        ("video/mp4", "mp4"),
        ("video/webm", "webm"),
    ]
    .iter()
    .cloned()
    .collect();

    map.get(mime_type).cloned()
}

/// Size limit and MIME allowlist, read from the `settings` table per upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_size_mb: u64,
    pub allowed_mime_types: HashSet<String>,
}

impl UploadPolicy {
    pub fn load(conn: &Connection) -> Self {
        let max_file_size_mb = users_db_operations::read_setting(conn, "max_file_upload_size_mb")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        let allowed_mime_types = users_db_operations::read_setting(conn, "allowed_mime_types")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            max_file_size_mb,
            allowed_mime_types,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Checks the type against the allowlist and returns its safe extension.
    pub fn check_type(&self, content_type: &str) -> Result<&'static str, StorageError> {
        if self.allowed_mime_types.is_empty() {
            return Err(StorageError::UploadsDisabled);
        }
        if !self.allowed_mime_types.contains(content_type) {
            return Err(StorageError::UnsupportedType(content_type.to_string()));
        }
        mime_to_safe_extension(content_type).ok_or_else(|| {
            log::error!("Allowed MIME type '{}' has no safe extension mapping.", content_type);
            StorageError::Misconfigured(format!("no extension mapping for '{}'", content_type))
        })
    }
}

/// One file part of a multipart upload, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.content_type)
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Original file name reduced to `[A-Za-z0-9_-]`, with the extension replaced
    /// by the one derived from the MIME type.
    pub fn safe_name(&self) -> String {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let mut cleaned: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
            .collect();
        cleaned.truncate(64);
        let cleaned = cleaned.trim_matches('-');
        let stem = if cleaned.is_empty() { "upload" } else { cleaned };
        format!("{}.{}", stem, self.extension)
    }
}

/// Multipart body split into its `file` parts and its plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}

/// Reads every part of `payload`. File parts are checked against `policy`
/// while streaming, so an oversized upload is rejected before it is buffered.
/// Text parts are capped at `MAX_FIELD_BYTES`, and a form carries at most
/// `MAX_FILES_PER_FORM` files.
pub async fn read_upload_form(mut payload: Multipart, policy: &UploadPolicy) -> Result<UploadForm, StorageError> {
    let max_bytes = policy.max_file_size_bytes();
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| StorageError::Multipart(e.to_string()))?;
        let field_name = field.content_disposition().get_name().unwrap_or_default().to_string();

        if field_name == "file" {
            if form.files.len() >= MAX_FILES_PER_FORM {
                return Err(StorageError::TooManyFiles(MAX_FILES_PER_FORM));
            }
            let content_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .ok_or_else(|| StorageError::Multipart("Content-Type not available.".into()))?;
            let extension = policy.check_type(&content_type)?;
            let file_name = field
                .content_disposition()
                .get_filename()
                .unwrap_or("upload")
                .to_string();

            let mut data = BytesMut::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| StorageError::Multipart(e.to_string()))?;
                if (data.len() + chunk.len()) as u64 > max_bytes {
                    return Err(StorageError::TooLarge(policy.max_file_size_mb));
                }
                data.extend_from_slice(&chunk);
            }
            form.files.push(UploadedFile {
                file_name,
                content_type,
                extension,
                bytes: data.to_vec(),
            });
        } else {
            let mut data = BytesMut::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| StorageError::Multipart(e.to_string()))?;
                if data.len() + chunk.len() > MAX_FIELD_BYTES {
                    return Err(StorageError::FieldTooLarge(field_name));
                }
                data.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(data.to_vec())
                .map_err(|_| StorageError::Multipart("Invalid UTF-8 in form field.".into()))?;
            form.fields.insert(field_name, value);
        }
    }
    Ok(form)
}

/// Resolves an object key to a file under the bucket. Keys are relative,
/// `/`-separated and may not climb out of the bucket.
pub fn object_file_path(media_path: &str, object_path: &str) -> Result<PathBuf, StorageError> {
    let invalid = || StorageError::InvalidPath(object_path.to_string());
    if object_path.is_empty() || object_path.contains('\\') || object_path.starts_with('/') {
        return Err(invalid());
    }
    let relative = Path::new(object_path);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid());
    }
    Ok(PathBuf::from(media_path).join(BUCKET).join(relative))
}

pub fn public_url(config: &Config, object_path: &str) -> String {
    format!("{}/media/{}/{}", config.public_base_url, BUCKET, object_path)
}

/// Writes `bytes` to `object_path`, replacing any existing object, and returns
/// the object's public URL.
pub async fn upload_object(config: &Config, object_path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
    let target = object_file_path(&config.media_path, object_path)?;
    web::block(move || -> std::io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        // Staged then renamed; readers never see a partial object.
        let staging = target.with_extension(format!("{}.part", Uuid::new_v4().simple()));
        let written = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, &target));
        if written.is_err() {
            if let Err(e) = fs::remove_file(&staging) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove staging file '{}': {}", staging.display(), e);
                }
            }
        }
        written
    })
    .await??;
    Ok(public_url(config, object_path))
}

/// Removes an object. A missing object counts as deleted; failures are logged.
pub async fn delete_object(config: &Config, object_path: &str) -> bool {
    let target = match object_file_path(&config.media_path, object_path) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Refusing to delete object: {}", e);
            return false;
        }
    };
    match web::block(move || fs::remove_file(&target)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => true,
        Ok(Err(e)) => {
            log::error!("Failed to delete object '{}': {}", object_path, e);
            false
        }
        Err(e) => {
            log::error!("Blocking error deleting object '{}': {}", object_path, e);
            false
        }
    }
}

/// Stores an uploaded file at `object_path` and describes it for the media library.
pub async fn store_upload(
    config: &Config,
    author_id: &str,
    object_path: &str,
    file: UploadedFile,
    alt_text: Option<String>,
) -> Result<MediaObject, StorageError> {
    let kind = file.kind();
    let file_name = file.file_name.clone();
    let file_url = upload_object(config, object_path, file.bytes).await?;
    Ok(MediaObject {
        id: Uuid::new_v4().to_string(),
        author_id: author_id.to_string(),
        file_name,
        file_url,
        file_type: kind,
        storage_path: object_path.to_string(),
        alt_text,
        created_at: Utc::now().to_rfc3339(),
    })
}
