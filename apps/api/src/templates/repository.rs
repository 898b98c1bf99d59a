//! Template repository: the set of known templates.
//!
//! `AppState` holds an `Arc<dyn TemplateRepository>`: in-memory for local
//! storage (rebuilt from the templates directory at startup), Postgres for S3.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::models::template::TemplateRecord;

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// All templates, oldest first.
    async fn list(&self) -> Result<Vec<TemplateRecord>, AppError>;

    async fn find(&self, id: &str) -> Result<Option<TemplateRecord>, AppError>;

    /// Adds a new template. Records are immutable, so a taken id is rejected.
    async fn register(&self, record: TemplateRecord) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryTemplateRepository {
    records: RwLock<Vec<TemplateRecord>>,
}

impl InMemoryTemplateRepository {
    pub fn with_records(mut records: Vec<TemplateRecord>) -> Self {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn list(&self) -> Result<Vec<TemplateRecord>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<TemplateRecord>, AppError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn register(&self, record: TemplateRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(AppError::UploadRejected(format!(
                "Template {} already exists",
                record.id
            )));
        }
        info!("Registered template {} ({})", record.id, record.display_name);
        records.push(record);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres backend
// ────────────────────────────────────────────────────────────────────────────

pub struct PgTemplateRepository {
    pool: PgPool,
}

impl PgTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn list(&self) -> Result<Vec<TemplateRecord>, AppError> {
        Ok(sqlx::query_as::<_, TemplateRecord>(
            "SELECT * FROM templates ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find(&self, id: &str) -> Result<Option<TemplateRecord>, AppError> {
        Ok(
            sqlx::query_as::<_, TemplateRecord>("SELECT * FROM templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn register(&self, record: TemplateRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO templates
                (id, display_name, body_location, preview_location, owner, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.display_name)
        .bind(&record.body_location)
        .bind(&record.preview_location)
        .bind(&record.owner)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UploadRejected(format!(
                "Template {} already exists",
                record.id
            )));
        }
        info!("Registered template {} ({})", record.id, record.display_name);
        Ok(())
    }
}
