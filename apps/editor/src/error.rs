use thiserror::Error;

use crate::document::SectionId;

/// Every failure the editor can report.
///
/// Export-related variants never escape the public export entry points: they
/// are logged and turned into a single user-facing message there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("required control '{0}' is missing from the page")]
    MissingControl(String),

    #[error("unsupported section kind: {0}")]
    UnsupportedSectionKind(String),

    #[error("unsupported template: {0}")]
    UnsupportedTemplate(String),

    #[error("section {0} not found")]
    SectionNotFound(SectionId),

    #[error("resume template root not found on the page")]
    MissingTemplateRoot,

    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("document assembly failed: {0}")]
    Assembly(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl EditorError {
    /// The one readable sentence shown to the user when an export fails.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::MissingTemplateRoot => {
                "Nothing to export: the resume template is not on the page.".to_string()
            }
            EditorError::ExportInProgress => {
                "An export is already running. Please wait for it to finish.".to_string()
            }
            other => format!("Export failed: {other}. Please try again."),
        }
    }
}
