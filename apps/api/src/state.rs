use std::sync::Arc;

use crate::config::Config;
use crate::profile::ProfileSource;
use crate::templates::repository::TemplateRepository;
use crate::templates::store::TemplateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The known template set. Replaces any process-wide list of template ids.
    pub templates: Arc<dyn TemplateRepository>,
    /// Template bodies and preview images (local disk or S3).
    pub store: Arc<dyn TemplateStore>,
    /// Single authoritative source of resume data.
    pub profiles: Arc<dyn ProfileSource>,
}
