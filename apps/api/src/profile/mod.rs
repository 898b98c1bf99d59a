//! Profile source: the single authoritative provider of resume data.
//!
//! `AppState` holds an `Arc<dyn ProfileSource>`. Render handlers never fail
//! because of this source: any error degrades to the empty `ResumeData`.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

pub mod mapping;
pub mod models;

use models::ExternalProfile;

const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("profile service returned status {0}")]
    Status(u16),

    #[error("no profile service configured")]
    NotConfigured,
}

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, profile_id: &str) -> Result<ExternalProfile, ProfileError>;
}

/// Fetches `GET {base_url}/profiles/{id}` from the profile service.
#[derive(Clone)]
pub struct HttpProfileSource {
    client: Client,
    base_url: reqwest::Url,
}

impl HttpProfileSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            bail!("PROFILE_SERVICE_URL must be an http(s) base URL, got '{base_url}'");
        }
        Ok(Self {
            client: Client::builder().timeout(PROFILE_TIMEOUT).build()?,
            base_url,
        })
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch(&self, profile_id: &str) -> Result<ExternalProfile, ProfileError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProfileError::NotConfigured)?
            .pop_if_empty()
            .extend(["profiles", profile_id]);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProfileError::Status(status.as_u16()));
        }
        let profile: ExternalProfile = response.json().await?;
        debug!("Fetched profile {profile_id}");
        Ok(profile)
    }
}

/// Used when `PROFILE_SERVICE_URL` is unset: every fetch fails, so renders use empty data.
pub struct UnconfiguredProfileSource;

#[async_trait]
impl ProfileSource for UnconfiguredProfileSource {
    async fn fetch(&self, _profile_id: &str) -> Result<ExternalProfile, ProfileError> {
        Err(ProfileError::NotConfigured)
    }
}
