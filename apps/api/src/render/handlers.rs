//! Axum route handlers for rendering templates.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::profile::mapping::map_profile;
use crate::render::fill::{fill_template, placeholder_document};
use crate::render::shell::editor_shell;
use crate::state::AppState;

const MAX_PROFILE_ID_LEN: usize = 128;

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    pub profile_id: Option<String>,
}

impl RenderQuery {
    /// The trimmed profile id, if one was given. Ids are opaque tokens of
    /// letters, digits, `-` and `_`.
    pub fn profile_id(&self) -> Result<Option<&str>, AppError> {
        let Some(id) = self.profile_id.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        if id.len() > MAX_PROFILE_ID_LEN
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::Validation(format!("Invalid profile_id '{id}'")));
        }
        Ok(Some(id))
    }
}

/// Resolves the template, loads its body and the profile, and fills it.
///
/// An unknown id is the only hard failure, and it happens before the profile
/// id is even looked at. A missing body, a malformed profile id or an
/// unavailable profile degrade the render instead of failing it.
pub async fn render_resume(
    state: &AppState,
    template_id: &str,
    query: &RenderQuery,
) -> Result<String, AppError> {
    let record = state
        .templates
        .find(template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))?;

    let body = match state.store.read_template(&record).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Template {template_id} body unavailable: {e}");
            return Ok(placeholder_document(template_id));
        }
    };

    let data = match query.profile_id() {
        Ok(profile_id) => load_resume_data(state, profile_id).await,
        Err(e) => {
            warn!("{e}; rendering template {template_id} with an empty resume");
            ResumeData::default()
        }
    };
    Ok(fill_template(&body, &data))
}

async fn load_resume_data(state: &AppState, profile_id: Option<&str>) -> ResumeData {
    let Some(profile_id) = profile_id else {
        return ResumeData::default();
    };
    match state.profiles.fetch(profile_id).await {
        Ok(profile) => map_profile(profile),
        Err(e) => {
            warn!("Profile {profile_id} unavailable, rendering empty resume: {e}");
            ResumeData::default()
        }
    }
}

/// GET /view-resume/:template_id
pub async fn handle_view_resume(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Html<String>, AppError> {
    let filled = render_resume(&state, &template_id, &query).await?;
    Ok(Html(filled))
}

/// GET /resume/:template_id
pub async fn handle_editor(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Html<String>, AppError> {
    let filled = render_resume(&state, &template_id, &query).await?;
    info!("Serving editor for template {template_id}");
    Ok(Html(editor_shell(&template_id, &filled)))
}
