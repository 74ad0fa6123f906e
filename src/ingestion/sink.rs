//! Remote insert targets for the loader
//!
//! Every call is a blind append of one batch. Nothing is upserted and no
//! transaction spans more than one batch.

use crate::config::DbTarget;
use crate::error::{IngestError, Result};
use crate::ingestion::types::Table;
use crate::ingestion::utils::http_client;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

/// Accepts batches of row objects keyed by column name
#[async_trait]
pub trait TableSink: Send + Sync {
    async fn insert_batch(&self, table: Table, rows: &[Value]) -> Result<()>;
}

/// Supabase PostgREST table endpoint
#[derive(Debug, Clone)]
pub struct RestSink {
    client: Client,
    url: String,
    key: String,
}

impl RestSink {
    pub fn new(client: Client, url: &str, key: &str) -> Self {
        RestSink {
            client,
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.url, table.name())
    }
}

#[async_trait]
impl TableSink for RestSink {
    async fn insert_batch(&self, table: Table, rows: &[Value]) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Insert {
                table: table.name().to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        debug!("Inserted {} rows into {} via REST", rows.len(), table);
        Ok(())
    }
}

/// Direct Postgres connection
#[derive(Debug, Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Ok(PgSink { pool })
    }
}

/// Single statement inserting a JSON array of row objects into `table`
fn insert_sql(table: Table) -> String {
    let columns = table.columns().join(", ");
    format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_recordset(NULL::{table}, $1)",
        table = table.name(),
        columns = columns,
    )
}

#[async_trait]
impl TableSink for PgSink {
    async fn insert_batch(&self, table: Table, rows: &[Value]) -> Result<()> {
        let result = sqlx::query(&insert_sql(table))
            .bind(Json(rows))
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::Insert {
                table: table.name().to_string(),
                message: e.to_string(),
            })?;

        debug!(
            "Inserted {} rows into {} via Postgres",
            result.rows_affected(),
            table
        );
        Ok(())
    }
}

/// Build the sink selected by configuration
pub async fn connect(target: &DbTarget) -> Result<Box<dyn TableSink>> {
    match target {
        DbTarget::Rest { url, key } => {
            info!("Using REST target {}", url);
            Ok(Box::new(RestSink::new(http_client()?, url, key)))
        }
        DbTarget::Postgres { url } => {
            info!("Using direct Postgres target");
            Ok(Box::new(PgSink::connect(url).await?))
        }
    }
}
