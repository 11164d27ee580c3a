//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). Tables are schemaless; the schema
//! below only declares tables and indexes, and is applied on every start.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Table and index definitions (idempotent)
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS category SCHEMALESS;
DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
DEFINE INDEX IF NOT EXISTS product_category ON TABLE product FIELDS category;
DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
DEFINE INDEX IF NOT EXISTS order_number_unique ON TABLE orders FIELDS order_number UNIQUE;
DEFINE INDEX IF NOT EXISTS order_created_at ON TABLE orders FIELDS created_at;
DEFINE TABLE IF NOT EXISTS testimonial SCHEMALESS;
DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;
"#;

/// Database service, owns the SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply the schema
    pub async fn new(db_path: &str, namespace: &str, database: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        let service = Self { db };
        service.apply_schema().await?;

        tracing::info!(path = %db_path, namespace, database, "Database ready");
        Ok(service)
    }

    async fn apply_schema(&self) -> Result<(), AppError> {
        self.db
            .query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
        Ok(())
    }

    /// Lightweight liveness probe
    pub async fn ping(&self) -> Result<(), AppError> {
        self.db
            .query("RETURN true")
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Database unavailable: {e}")))?;
        Ok(())
    }
}
