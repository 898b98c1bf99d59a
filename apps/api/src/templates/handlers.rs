//! Axum route handlers for template upload and listing.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::template::{TemplateRecord, TemplateSummary};
use crate::state::AppState;
use crate::templates::upload::{read_form, validate_upload, ValidatedUpload};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub template_id: String,
    pub allowed_templates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
    pub allowed_templates: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload-template
///
/// Multipart form: `resumeTemplate` (.html), `previewImage`, optional `name` and `uploadedBy`.
/// Stores both files, records the template, and returns the updated id list.
pub async fn handle_upload_template(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = validate_upload(read_form(multipart).await?)?;

    let id = state.store.allocate_id(&upload.template_filename)?;
    if state.templates.find(&id).await?.is_some() {
        return Err(AppError::UploadRejected(format!(
            "Template {id} already exists"
        )));
    }

    let ValidatedUpload {
        template_body,
        preview_extension,
        preview,
        display_name,
        owner,
        ..
    } = upload;

    // A rejection means another upload owns the id and its files.
    let body_location = match state.store.put_template(&id, template_body).await {
        Ok(location) => location,
        Err(e @ AppError::UploadRejected(_)) => return Err(e),
        Err(e) => {
            state.store.discard(&id, &preview_extension).await;
            return Err(e);
        }
    };

    let stored = store_preview_and_register(
        &state,
        TemplateRecord {
            id: id.clone(),
            display_name,
            body_location,
            preview_location: None,
            owner,
            created_at: Utc::now(),
        },
        &preview_extension,
        preview,
    )
    .await;
    if let Err(e) = stored {
        warn!("Upload of template {id} failed, removing stored files: {e}");
        state.store.discard(&id, &preview_extension).await;
        return Err(e);
    }

    let allowed_templates = template_ids(&state).await?;
    info!(
        "Template {id} uploaded; {} template(s) known",
        allowed_templates.len()
    );

    Ok(Json(UploadResponse {
        success: true,
        template_id: id,
        allowed_templates,
    }))
}

async fn store_preview_and_register(
    state: &AppState,
    mut record: TemplateRecord,
    preview_extension: &str,
    preview: Bytes,
) -> Result<(), AppError> {
    let preview_location = state
        .store
        .put_preview(&record.id, preview_extension, preview)
        .await?;
    record.preview_location = Some(preview_location);
    state.templates.register(record).await
}

/// GET /list-templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let records = state.templates.list().await?;
    Ok(Json(TemplateListResponse {
        allowed_templates: records.iter().map(|r| r.id.clone()).collect(),
        templates: records.iter().map(TemplateSummary::from).collect(),
    }))
}

async fn template_ids(state: &AppState) -> Result<Vec<String>, AppError> {
    Ok(state
        .templates
        .list()
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect())
}
