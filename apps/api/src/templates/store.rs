//! Template storage: where template bodies and preview images are kept.
//!
//! Local mode keeps the original filename convention (`resume_<digits>.html`,
//! id = the digits). S3 mode ignores the filename and generates a UUID.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::TemplateRecord;

pub const TEMPLATE_EXTENSION: &str = "html";
pub const PREVIEW_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const LOCAL_TEMPLATE_PREFIX: &str = "resume_";
const PREVIEW_URL_PREFIX: &str = "/previews";

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Chooses the id a newly uploaded template will be known by.
    fn allocate_id(&self, filename: &str) -> Result<String, AppError>;

    /// Stores the template body; returns its location.
    async fn put_template(&self, id: &str, body: Bytes) -> Result<String, AppError>;

    /// Stores the preview image; returns the URL browsers load it from.
    async fn put_preview(&self, id: &str, extension: &str, image: Bytes)
        -> Result<String, AppError>;

    async fn read_template(&self, record: &TemplateRecord) -> Result<String, AppError>;

    /// Removes whatever an unfinished upload of `id` already wrote. Failures are logged.
    async fn discard(&self, id: &str, preview_extension: &str);
}

fn already_exists(id: &str) -> AppError {
    AppError::UploadRejected(format!("Template {id} already exists"))
}

/// Extracts the id from a local template filename (`resume_07.html` → `07`).
pub fn local_template_id(filename: &str) -> Option<&str> {
    let id = filename
        .strip_prefix(LOCAL_TEMPLATE_PREFIX)?
        .strip_suffix(TEMPLATE_EXTENSION)?
        .strip_suffix('.')?;
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

// ────────────────────────────────────────────────────────────────────────────
// Local disk backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalTemplateStore {
    dir: PathBuf,
}

impl LocalTemplateStore {
    /// Opens (creating if needed) the templates directory and its `previews/` subdirectory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(dir.join("previews")).await?;
        info!("Using local template store at {}", dir.display());
        Ok(Self { dir })
    }

    fn template_path(&self, id: &str) -> PathBuf {
        self.dir
            .join(format!("{LOCAL_TEMPLATE_PREFIX}{id}.{TEMPLATE_EXTENSION}"))
    }

    fn previews_dir(&self) -> PathBuf {
        self.dir.join("previews")
    }

    /// Builds a record for every `resume_<digits>.html` file in the directory.
    pub async fn scan(&self) -> Result<Vec<TemplateRecord>, AppError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name();
            let Some(id) = filename.to_str().and_then(local_template_id) else {
                continue;
            };
            let created_at: DateTime<Utc> = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());
            records.push(TemplateRecord {
                id: id.to_string(),
                display_name: format!("Template {id}"),
                body_location: entry.path().to_string_lossy().into_owned(),
                preview_location: self.find_preview(id).await,
                owner: None,
                created_at,
            });
        }
        info!("Found {} template(s) in {}", records.len(), self.dir.display());
        Ok(records)
    }

    async fn find_preview(&self, id: &str) -> Option<String> {
        for ext in PREVIEW_EXTENSIONS {
            let name = format!("{id}.{ext}");
            if tokio::fs::try_exists(self.previews_dir().join(&name))
                .await
                .unwrap_or(false)
            {
                return Some(format!("{PREVIEW_URL_PREFIX}/{name}"));
            }
        }
        None
    }
}

#[async_trait]
impl TemplateStore for LocalTemplateStore {
    fn allocate_id(&self, filename: &str) -> Result<String, AppError> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        local_template_id(name).map(str::to_string).ok_or_else(|| {
            AppError::UploadRejected(format!(
                "Template files must be named {LOCAL_TEMPLATE_PREFIX}<number>.{TEMPLATE_EXTENSION}"
            ))
        })
    }

    /// Creates the body file. An existing file is never replaced, so the
    /// first upload of an id wins even when two race past the repository check.
    async fn put_template(&self, id: &str, body: Bytes) -> Result<String, AppError> {
        let path = self.template_path(id);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(already_exists(id)),
            Err(e) => return Err(e.into()),
        };
        file.write_all(&body).await?;
        file.flush().await?;
        debug!("Wrote template {id} to {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn put_preview(
        &self,
        id: &str,
        extension: &str,
        image: Bytes,
    ) -> Result<String, AppError> {
        let name = format!("{id}.{extension}");
        tokio::fs::write(self.previews_dir().join(&name), &image).await?;
        Ok(format!("{PREVIEW_URL_PREFIX}/{name}"))
    }

    async fn read_template(&self, record: &TemplateRecord) -> Result<String, AppError> {
        Ok(tokio::fs::read_to_string(&record.body_location).await?)
    }

    async fn discard(&self, id: &str, preview_extension: &str) {
        let preview = self.previews_dir().join(format!("{id}.{preview_extension}"));
        for path in [self.template_path(id), preview] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove {}: {e}", path.display()),
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 backend
// ────────────────────────────────────────────────────────────────────────────

pub struct S3TemplateStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3TemplateStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;
        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

fn template_key(id: &str) -> String {
    format!("templates/{id}/template.{TEMPLATE_EXTENSION}")
}

fn preview_key(id: &str, extension: &str) -> String {
    format!("templates/{id}/preview.{extension}")
}

fn image_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl TemplateStore for S3TemplateStore {
    fn allocate_id(&self, _filename: &str) -> Result<String, AppError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn put_template(&self, id: &str, body: Bytes) -> Result<String, AppError> {
        let key = template_key(id);
        self.put(&key, body, "text/html; charset=utf-8").await?;
        Ok(key)
    }

    async fn put_preview(
        &self,
        id: &str,
        extension: &str,
        image: Bytes,
    ) -> Result<String, AppError> {
        let key = preview_key(id, extension);
        self.put(&key, image, image_content_type(extension)).await?;
        Ok(format!("{}/{}/{}", self.public_url, self.bucket, key))
    }

    async fn read_template(&self, record: &TemplateRecord) -> Result<String, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&record.body_location)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("fetch of {} failed: {e}", record.body_location)))?;
        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(format!("read of {} failed: {e}", record.body_location)))?
            .into_bytes();
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            warn!("Template {} is not valid UTF-8", record.id);
            AppError::S3(format!("template {} is not UTF-8: {e}", record.id))
        })
    }

    async fn discard(&self, id: &str, preview_extension: &str) {
        for key in [template_key(id), preview_key(id, preview_extension)] {
            if let Err(e) = self
                .client
                .delete_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
            {
                warn!("Could not delete s3://{}/{key}: {e}", self.bucket);
            }
        }
    }
}
