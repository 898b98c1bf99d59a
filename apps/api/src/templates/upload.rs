//! Upload validation: turns raw multipart fields into a checked upload.
//!
//! Only file extensions and basic shape are checked; template bodies are
//! trusted markup supplied by whoever operates the service.

use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;
use crate::templates::store::{PREVIEW_EXTENSIONS, TEMPLATE_EXTENSION};

pub const TEMPLATE_FIELD: &str = "resumeTemplate";
pub const PREVIEW_FIELD: &str = "previewImage";
pub const NAME_FIELD: &str = "name";
pub const OWNER_FIELD: &str = "uploadedBy";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Raw form contents, as received.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub template: Option<UploadedFile>,
    pub preview: Option<UploadedFile>,
    pub name: Option<String>,
    pub owner: Option<String>,
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub template_filename: String,
    pub template_body: Bytes,
    pub preview_extension: String,
    pub preview: Bytes,
    pub display_name: String,
    pub owner: Option<String>,
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn reject(message: impl Into<String>) -> AppError {
    AppError::UploadRejected(message.into())
}

/// Reads every multipart field into an `UploadForm`. Unknown fields are skipped.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        match name.as_str() {
            TEMPLATE_FIELD | PREVIEW_FIELD => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| reject(format!("Could not read {name}: {e}")))?;
                let file = UploadedFile {
                    filename: filename.unwrap_or_default(),
                    data,
                };
                if name == TEMPLATE_FIELD {
                    form.template = Some(file);
                } else {
                    form.preview = Some(file);
                }
            }
            NAME_FIELD | OWNER_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| reject(format!("Could not read {name}: {e}")))?;
                let text = Some(text.trim().to_string()).filter(|t| !t.is_empty());
                if name == NAME_FIELD {
                    form.name = text;
                } else {
                    form.owner = text;
                }
            }
            other => tracing::debug!("Ignoring unexpected upload field '{other}'"),
        }
    }
    Ok(form)
}

pub fn validate_upload(form: UploadForm) -> Result<ValidatedUpload, AppError> {
    let template = form
        .template
        .filter(|f| !f.filename.is_empty())
        .ok_or_else(|| reject("No template file uploaded"))?;
    if extension_of(&template.filename).as_deref() != Some(TEMPLATE_EXTENSION) {
        return Err(reject(format!(
            "Only .{TEMPLATE_EXTENSION} template files are allowed"
        )));
    }
    if template.data.is_empty() {
        return Err(reject("Template file is empty"));
    }
    if std::str::from_utf8(&template.data).is_err() {
        return Err(reject("Template file must be UTF-8 text"));
    }

    let preview = form
        .preview
        .filter(|f| !f.filename.is_empty())
        .ok_or_else(|| reject("A preview image is required"))?;
    let preview_extension = extension_of(&preview.filename)
        .filter(|ext| PREVIEW_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            reject(format!(
                "Preview image must be one of: {}",
                PREVIEW_EXTENSIONS.join(", ")
            ))
        })?;
    if preview.data.is_empty() {
        return Err(reject("Preview image is empty"));
    }

    let display_name = form.name.unwrap_or_else(|| {
        Path::new(&template.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled template")
            .to_string()
    });

    Ok(ValidatedUpload {
        template_filename: template.filename,
        template_body: template.data,
        preview_extension,
        preview: preview.data,
        display_name,
        owner: form.owner,
    })
}
