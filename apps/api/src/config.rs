use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where template bodies and previews live.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files under a local directory; the template set is rebuilt from it at startup.
    Local { templates_dir: PathBuf },
    /// S3-compatible object store for files, Postgres for metadata.
    S3 {
        database_url: String,
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
        /// Base URL browsers use to fetch preview images. Defaults to the endpoint.
        public_url: String,
    },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if variables required by the chosen storage mode are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage: StorageConfig,
    /// Base URL of the profile service. Renders use empty data when unset.
    pub profile_service_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = match optional_env("TEMPLATE_STORAGE")
            .unwrap_or_else(|| "local".to_string())
            .as_str()
        {
            "local" => StorageConfig::Local {
                templates_dir: optional_env("TEMPLATES_DIR")
                    .unwrap_or_else(|| "./templates".to_string())
                    .into(),
            },
            "s3" => {
                let endpoint = require_env("S3_ENDPOINT")?;
                StorageConfig::S3 {
                    database_url: require_env("DATABASE_URL")?,
                    bucket: require_env("S3_BUCKET")?,
                    access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                    secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
                    public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| endpoint.clone()),
                    endpoint,
                }
            }
            other => bail!("TEMPLATE_STORAGE must be 'local' or 's3', got '{other}'"),
        };

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage,
            profile_service_url: optional_env("PROFILE_SERVICE_URL"),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    /// Directory served at `/previews` in local mode.
    pub fn preview_dir(&self) -> Option<PathBuf> {
        match &self.storage {
            StorageConfig::Local { templates_dir } => Some(templates_dir.join("previews")),
            StorageConfig::S3 { .. } => None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
