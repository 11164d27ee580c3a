//! Category Repository

use super::{BaseRepository, FIELDS, RepoError, RepoResult};
use crate::db::models::{Category, CategoryRecord};
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all categories, oldest first
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query(format!("SELECT {FIELDS} FROM {TABLE} ORDER BY created_at ASC"))
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        self.base.find_one(TABLE, id).await
    }

    /// Resolve a set of ids into an id → category map
    pub async fn find_map(&self, ids: &[String]) -> RepoResult<HashMap<String, Category>> {
        let categories: Vec<Category> = self.base.find_many(TABLE, ids, None).await?;
        Ok(categories.into_iter().map(|c| (c.id.clone(), c)).collect())
    }

    /// Create a new category
    pub async fn create(&self, name: String, now: i64) -> RepoResult<Category> {
        let record = CategoryRecord {
            name,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert(TABLE, record).await?;
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Category {id} vanished after create")))
    }

    /// Rename a category
    pub async fn update(&self, id: &str, name: String, now: i64) -> RepoResult<Category> {
        let patch = serde_json::json!({ "name": name, "updated_at": now });
        if !self.base.merge(TABLE, id, patch).await? {
            return Err(RepoError::NotFound(format!("Category {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    /// Hard delete a category
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.remove(TABLE, id).await
    }
}
