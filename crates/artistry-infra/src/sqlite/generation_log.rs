//! SQLite generation history.
//!
//! Implements the `GenerationLogStore` port: one row per top-level
//! generation call, queried newest first with optional filters.

use artistry_core::log::GenerationLogStore;
use artistry_types::error::RepositoryError;
use artistry_types::generation::OperationKind;
use artistry_types::log::{GenerationLogEntry, GenerationLogQuery};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::pool::DatabasePool;

/// Default page size when a query sets no limit.
const DEFAULT_LIMIT: u32 = 100;

/// SQLite-backed generation history.
pub struct SqliteGenerationLogStore {
    pool: DatabasePool,
}

impl SqliteGenerationLogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generation_logs")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    /// Look up a single entry by generation id.
    pub async fn get(&self, id: &Uuid) -> Result<GenerationLogEntry, RepositoryError> {
        let row = sqlx::query("SELECT * FROM generation_logs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        LogRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_entry()
    }
}

impl GenerationLogStore for SqliteGenerationLogStore {
    async fn save(&self, entry: &GenerationLogEntry) -> Result<(), RepositoryError> {
        let parameters = serde_json::to_string(&entry.parameters)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let result = entry
            .result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO generation_logs (id, user_id, operation, provider, parameters, result, error, duration_ms, success, cached, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.user_id)
        .bind(entry.operation.to_string())
        .bind(&entry.provider)
        .bind(parameters)
        .bind(result)
        .bind(&entry.error)
        .bind(entry.duration_ms as i64)
        .bind(entry.success)
        .bind(entry.cached)
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn query(&self, query: &GenerationLogQuery) -> Result<Vec<GenerationLogEntry>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM generation_logs WHERE 1 = 1");

        if let Some(user_id) = &query.user_id {
            builder.push(" AND user_id = ").push_bind(user_id.clone());
        }
        if let Some(operation) = query.operation {
            builder.push(" AND operation = ").push_bind(operation.to_string());
        }
        if let Some(provider) = &query.provider {
            builder.push(" AND provider = ").push_bind(provider.clone());
        }
        if let Some(success) = query.success {
            builder.push(" AND success = ").push_bind(success);
        }
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.limit.unwrap_or(DEFAULT_LIMIT)));

        let rows = builder
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let log_row = LogRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(log_row.into_entry()?);
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct LogRow {
    id: String,
    user_id: String,
    operation: String,
    provider: String,
    parameters: String,
    result: Option<String>,
    error: Option<String>,
    duration_ms: i64,
    success: bool,
    cached: bool,
    created_at: String,
}

impl LogRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            operation: row.try_get("operation")?,
            provider: row.try_get("provider")?,
            parameters: row.try_get("parameters")?,
            result: row.try_get("result")?,
            error: row.try_get("error")?,
            duration_ms: row.try_get("duration_ms")?,
            success: row.try_get("success")?,
            cached: row.try_get("cached")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<GenerationLogEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid generation id: {e}")))?;
        let operation: OperationKind = self
            .operation
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let parameters = serde_json::from_str(&self.parameters)
            .map_err(|e| RepositoryError::Query(format!("invalid parameters json: {e}")))?;
        let result = self
            .result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid result json: {e}")))?;

        Ok(GenerationLogEntry {
            id,
            user_id: self.user_id,
            operation,
            provider: self.provider,
            parameters,
            result,
            error: self.error,
            duration_ms: self.duration_ms.max(0) as u64,
            success: self.success,
            cached: self.cached,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
