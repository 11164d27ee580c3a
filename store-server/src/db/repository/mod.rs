//! Repository Module
//!
//! Provides CRUD operations for the SurrealDB tables.

pub mod category;
pub mod counter;
pub mod order;
pub mod product;
pub mod testimonial;

// Re-exports
pub use category::CategoryRepository;
pub use counter::CounterRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use testimonial::TestimonialRepository;

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimistic transaction lost a read/write race; nothing was applied
    #[error("Write conflict: {0}")]
    Conflict(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if is_retryable_conflict(&message) {
            RepoError::Conflict(message)
        } else {
            RepoError::Database(message)
        }
    }
}

/// "Failed to commit transaction due to a read or write conflict. This
/// transaction can be retried"
fn is_retryable_conflict(message: &str) -> bool {
    message.contains("can be retried") || message.contains("read or write conflict")
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Conflict(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Conflict Retry
// =============================================================================

/// Attempts for a single write statement before a conflict is reported
pub(crate) const MAX_CONFLICT_ATTEMPTS: u32 = 10;
/// Base backoff delay, doubled per attempt
const CONFLICT_BASE_DELAY_MS: u64 = 2;
/// Backoff ceiling
const CONFLICT_MAX_DELAY_MS: u64 = 100;

/// Run a single-statement write, retrying while it loses transaction conflicts
///
/// A conflicted statement was rolled back, so running it again is safe for
/// conditional writes (`WHERE quantity >= $qty`, `WHERE status != ...`) and
/// counter increments. Only an exhausted retry surfaces, as a database error.
pub(crate) async fn retry_on_conflict<T, F, Fut>(operation: &str, mut run: F) -> RepoResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = RepoResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..MAX_CONFLICT_ATTEMPTS {
        match run().await {
            Err(RepoError::Conflict(msg)) => {
                tracing::debug!(operation, attempt = attempt + 1, "Write conflict, retrying");
                last_error = Some(msg);
                if attempt + 1 < MAX_CONFLICT_ATTEMPTS {
                    let delay_ms = (CONFLICT_BASE_DELAY_MS << attempt).min(CONFLICT_MAX_DELAY_MS);
                    // Jitter spreads out callers that collided on the same record
                    let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms);
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms)).await;
                }
            }
            other => return other,
        }
    }

    let msg = last_error.unwrap_or_else(|| "write conflict".to_string());
    tracing::error!(
        operation,
        attempts = MAX_CONFLICT_ATTEMPTS,
        error = %msg,
        "Write conflict persisted after retries"
    );
    Err(RepoError::Database(msg))
}

// =============================================================================
// ID Convention
// =============================================================================
//
// API 层只看到纯 key 字符串 ("3f2a...")，不带表名前缀：
//   - 读取: SELECT *, record::id(id) AS id FROM ...
//   - 定位: RecordId::from_table_key(TABLE, key)，bind 为 $thing
//   - 新建: key 由 uuid v4 (simple) 生成，写入前已知

/// Projection that replaces the record id with its plain key
pub(crate) const FIELDS: &str = "*, record::id(id) AS id";

/// Build a record id from a table and a plain key
pub(crate) fn thing(table: &str, key: &str) -> RecordId {
    RecordId::from_table_key(table, key.to_string())
}

/// Fresh record key
pub(crate) fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// `SELECT count() AS total ... GROUP ALL` row
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub total: u64,
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Select one record by key
    pub(crate) async fn find_one<T>(&self, table: &str, key: &str) -> RepoResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut result = self
            .db
            .query(format!("SELECT {FIELDS} FROM $thing"))
            .bind(("thing", thing(table, key)))
            .await?;
        let rows: Vec<T> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Select records by keys (unknown keys are skipped)
    pub(crate) async fn find_many<T>(
        &self,
        table: &str,
        keys: &[String],
        condition: Option<&str>,
    ) -> RepoResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let things: Vec<RecordId> = keys.iter().map(|k| thing(table, k)).collect();
        let where_clause = condition
            .map(|c| format!(" WHERE {c}"))
            .unwrap_or_default();
        let mut result = self
            .db
            .query(format!(
                "SELECT {FIELDS} FROM $things{where_clause} ORDER BY created_at DESC"
            ))
            .bind(("things", things))
            .await?;
        let rows: Vec<T> = result.take(0)?;
        Ok(rows)
    }

    /// Create a record under a fresh key, returning the key
    pub(crate) async fn insert<T>(&self, table: &str, data: T) -> RepoResult<String>
    where
        T: serde::Serialize + 'static,
    {
        let key = new_key();
        self.db
            .query("CREATE $thing CONTENT $data RETURN NONE")
            .bind(("thing", thing(table, &key)))
            .bind(("data", data))
            .await?
            .check()?;
        Ok(key)
    }

    /// Merge a patch into an existing record; `false` when the record is absent
    pub(crate) async fn merge<T>(&self, table: &str, key: &str, patch: T) -> RepoResult<bool>
    where
        T: serde::Serialize + 'static,
    {
        let mut result = self
            .db
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing(table, key)))
            .bind(("data", patch))
            .await?;
        let rows: Vec<TouchedRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    /// Delete a record; `false` when it did not exist
    pub(crate) async fn remove(&self, table: &str, key: &str) -> RepoResult<bool> {
        let mut result = self
            .db
            .query("DELETE $thing RETURN BEFORE")
            .bind(("thing", thing(table, key)))
            .await?;
        let rows: Vec<TouchedRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    /// Run a `SELECT count() AS total ... GROUP ALL` query
    pub(crate) async fn count(&self, sql: &str) -> RepoResult<u64> {
        let mut result = self.db.query(sql).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

/// Any row touched by a write; only its existence matters
#[derive(Debug, Deserialize)]
pub(crate) struct TouchedRow {
    #[allow(dead_code)]
    updated_at: Option<i64>,
}
