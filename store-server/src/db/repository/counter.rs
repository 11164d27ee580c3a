//! Counter Repository
//!
//! Named monotonic sequences stored as `counter:<name>` records. Each
//! `next` is a single atomic `UPSERT ... SET seq += 1`, so concurrent
//! callers never observe the same value.

use super::{BaseRepository, RepoError, RepoResult, retry_on_conflict, thing};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "counter";

/// Sequence backing human-facing order numbers
pub const ORDER_NUMBER_SEQUENCE: &str = "order_number";

#[derive(Debug, Deserialize)]
struct SeqRow {
    seq: i64,
}

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Increment the sequence and return the new value (first call returns 1)
    ///
    /// Every order increments the same record, so conflicts are expected
    /// under load and retried.
    pub async fn next(&self, name: &str) -> RepoResult<u64> {
        retry_on_conflict("counter increment", || self.increment(name)).await
    }

    async fn increment(&self, name: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("UPSERT $thing SET seq += 1 RETURN AFTER")
            .bind(("thing", thing(TABLE, name)))
            .await?;
        let rows: Vec<SeqRow> = result.take(0)?;
        let seq = rows
            .first()
            .map(|r| r.seq)
            .ok_or_else(|| RepoError::Database(format!("Counter '{name}' was not updated")))?;
        u64::try_from(seq)
            .map_err(|_| RepoError::Database(format!("Counter '{name}' holds invalid value {seq}")))
    }

    /// Current value without incrementing (0 when never used)
    pub async fn current(&self, name: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT seq FROM $thing")
            .bind(("thing", thing(TABLE, name)))
            .await?;
        let rows: Vec<SeqRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.seq.max(0) as u64).unwrap_or(0))
    }
}
