use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for one uploaded template. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TemplateRecord {
    pub id: String,
    pub display_name: String,
    /// Local file path or S3 object key of the template body.
    pub body_location: String,
    /// Public URL of the preview image, if one was uploaded.
    pub preview_location: Option<String>,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry in the template listing returned to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub preview_url: Option<String>,
}

impl From<&TemplateRecord> for TemplateSummary {
    fn from(record: &TemplateRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.display_name.clone(),
            preview_url: record.preview_location.clone(),
        }
    }
}
