mod config;
mod db;
mod errors;
mod models;
mod profile;
mod render;
mod routes;
mod state;
mod templates;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, StorageConfig};
use crate::db::create_pool;
use crate::profile::{HttpProfileSource, ProfileSource, UnconfiguredProfileSource};
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::repository::{
    InMemoryTemplateRepository, PgTemplateRepository, TemplateRepository,
};
use crate::templates::store::{LocalTemplateStore, S3TemplateStore, TemplateStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize template storage
    let (templates, store): (Arc<dyn TemplateRepository>, Arc<dyn TemplateStore>) =
        match &config.storage {
            StorageConfig::Local { templates_dir } => {
                let store = LocalTemplateStore::open(templates_dir.clone()).await?;
                let records = store.scan().await?;
                (
                    Arc::new(InMemoryTemplateRepository::with_records(records)),
                    Arc::new(store),
                )
            }
            StorageConfig::S3 {
                database_url,
                bucket,
                endpoint,
                access_key_id,
                secret_access_key,
                public_url,
            } => {
                let db = create_pool(database_url).await?;
                let s3 = build_s3_client(endpoint, access_key_id, secret_access_key).await;
                info!("S3 client initialized (bucket: {bucket})");
                (
                    Arc::new(PgTemplateRepository::new(db)),
                    Arc::new(S3TemplateStore::new(s3, bucket.clone(), public_url.clone())),
                )
            }
        };

    // Initialize profile source
    let profiles: Arc<dyn ProfileSource> = match &config.profile_service_url {
        Some(url) => {
            info!("Profile service at {url}");
            Arc::new(HttpProfileSource::new(url)?)
        }
        None => {
            warn!("PROFILE_SERVICE_URL not set; resumes render with empty data");
            Arc::new(UnconfiguredProfileSource)
        }
    };

    let state = AppState {
        config: config.clone(),
        templates,
        store,
        profiles,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Constructs an S3 client for an S3-compatible endpoint (MinIO locally, AWS in production).
async fn build_s3_client(
    endpoint: &str,
    access_key_id: &str,
    secret_access_key: &str,
) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "vitae-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
