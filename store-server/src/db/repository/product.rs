//! Product Repository
//!
//! Stock mutations are single conditional statements: a decrement only
//! applies while enough stock remains and the product is active, so two
//! concurrent orders can never both take the last unit. Statements that
//! lose a transaction conflict are re-run (see [`super::retry_on_conflict`]).

use super::{BaseRepository, FIELDS, RepoError, RepoResult, retry_on_conflict, thing};
use crate::db::models::{Product, ProductFilter, ProductPatch, ProductRecord};
use serde::Deserialize;
use shared::models::LOW_STOCK_THRESHOLD;
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Debug, Deserialize)]
struct StockRow {
    quantity: i64,
}

/// Stock level counts over active products
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockCounts {
    pub total: u64,
    pub out_of_stock: u64,
    pub low_stock: u64,
    pub in_stock: u64,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find active products matching the filter
    pub async fn find_all(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let mut conditions = vec!["is_active = true"];

        if filter.category.is_some() {
            conditions.push("category = $category");
        }
        if filter.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(title), $search) \
                 OR string::contains(string::lowercase(description), $search))",
            );
        }
        if filter.min_price.is_some() {
            conditions.push("price >= $min_price");
        }
        if filter.max_price.is_some() {
            conditions.push("price <= $max_price");
        }
        if filter.only_in_stock() {
            conditions.push("quantity > 0");
        }
        if filter.size.is_some() {
            conditions.push("available_sizes CONTAINS $size");
        }

        // LIMIT is applied after the fetch: embedded WHERE + ORDER BY + LIMIT
        // can skip the first ordered row
        let sql = format!(
            "SELECT {FIELDS} FROM {TABLE} WHERE {} {}",
            conditions.join(" AND "),
            filter.sort_order().order_clause(),
        );

        let mut query = self.base.db().query(sql);
        if let Some(category) = &filter.category {
            query = query.bind(("category", category.clone()));
        }
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.trim().to_lowercase()));
        }
        if let Some(min) = filter.min_price {
            query = query.bind(("min_price", min));
        }
        if let Some(max) = filter.max_price {
            query = query.bind(("max_price", max));
        }
        if let Some(size) = &filter.size {
            query = query.bind(("size", size.clone()));
        }

        let mut products: Vec<Product> = query.await?.take(0)?;
        if let Some(limit) = filter.limit {
            products.truncate(limit as usize);
        }
        Ok(products)
    }

    /// Find product by id (any activity state)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        self.base.find_one(TABLE, id).await
    }

    /// Find products by ids, newest first
    pub async fn find_by_ids(&self, ids: &[String], active_only: bool) -> RepoResult<Vec<Product>> {
        let condition = active_only.then_some("is_active = true");
        self.base.find_many(TABLE, ids, condition).await
    }

    /// Resolve a set of ids into an id → product map (any activity state)
    pub async fn find_map(&self, ids: &[String]) -> RepoResult<HashMap<String, Product>> {
        let products = self.find_by_ids(ids, false).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Active, in-stock products of a category, newest first
    pub async fn find_by_category(&self, category_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(format!(
                "SELECT {FIELDS} FROM {TABLE} \
                 WHERE category = $category AND is_active = true AND quantity > 0 \
                 ORDER BY created_at DESC"
            ))
            .bind(("category", category_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, record: ProductRecord) -> RepoResult<Product> {
        let id = self.base.insert(TABLE, record).await?;
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Product {id} vanished after create")))
    }

    /// Merge a validated patch
    pub async fn update(&self, id: &str, patch: ProductPatch) -> RepoResult<Product> {
        if !self.base.merge(TABLE, id, patch).await? {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Overwrite the stock level
    pub async fn set_quantity(&self, id: &str, quantity: i64, now: i64) -> RepoResult<Product> {
        let patch = ProductPatch {
            quantity: Some(quantity),
            updated_at: now,
            ..Default::default()
        };
        self.update(id, patch).await
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.remove(TABLE, id).await
    }

    /// Conditionally take `quantity` units from an active product
    ///
    /// Returns the remaining stock, or `None` when the product is missing,
    /// inactive, or holds fewer than `quantity` units. Nothing changes in
    /// the `None` case.
    pub async fn try_decrement(&self, id: &str, quantity: i64, now: i64) -> RepoResult<Option<i64>> {
        retry_on_conflict("stock decrement", || {
            self.stock_write(
                "UPDATE $thing SET quantity -= $qty, updated_at = $now \
                 WHERE is_active = true AND quantity >= $qty RETURN AFTER",
                id,
                quantity,
                now,
            )
        })
        .await
    }

    /// Give `quantity` units back to a product
    ///
    /// Returns the new stock, or `None` when the product no longer exists.
    pub async fn increment(&self, id: &str, quantity: i64, now: i64) -> RepoResult<Option<i64>> {
        retry_on_conflict("stock increment", || {
            self.stock_write(
                "UPDATE $thing SET quantity += $qty, updated_at = $now RETURN AFTER",
                id,
                quantity,
                now,
            )
        })
        .await
    }

    /// One stock statement; the new quantity of the touched row, if any
    async fn stock_write(
        &self,
        sql: &'static str,
        id: &str,
        quantity: i64,
        now: i64,
    ) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("thing", thing(TABLE, id)))
            .bind(("qty", quantity))
            .bind(("now", now))
            .await?;
        let rows: Vec<StockRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.quantity))
    }

    /// Stock level counts over active products
    pub async fn stock_counts(&self) -> RepoResult<StockCounts> {
        let base = format!("SELECT count() AS total FROM {TABLE} WHERE is_active = true");
        Ok(StockCounts {
            total: self.base.count(&format!("{base} GROUP ALL")).await?,
            out_of_stock: self
                .base
                .count(&format!("{base} AND quantity <= 0 GROUP ALL"))
                .await?,
            low_stock: self
                .base
                .count(&format!(
                    "{base} AND quantity > 0 AND quantity <= {LOW_STOCK_THRESHOLD} GROUP ALL"
                ))
                .await?,
            in_stock: self
                .base
                .count(&format!("{base} AND quantity > {LOW_STOCK_THRESHOLD} GROUP ALL"))
                .await?,
        })
    }
}
