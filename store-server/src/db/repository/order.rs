//! Order Repository
//!
//! The order table is named `orders` (`ORDER` is a SurrealQL keyword).
//! Status writes are guarded on `status != 'cancelled'`, which makes
//! cancellation one-way even under concurrent requests.

use super::{BaseRepository, FIELDS, RepoError, RepoResult, retry_on_conflict, thing};
use crate::db::models::{Order, OrderFilter, OrderRecord, OrderSummary};
use serde::Deserialize;
use shared::models::OrderStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "orders";

#[derive(Debug, Deserialize)]
struct StatusRow {
    #[allow(dead_code)]
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
struct SumRow {
    total: Option<f64>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find orders matching the filter, newest first
    pub async fn find_all(&self, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
        let mut conditions = Vec::new();

        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.created_from.is_some() {
            conditions.push("created_at >= $from");
        }
        if filter.created_to.is_some() {
            conditions.push("created_at < $to");
        }
        if filter.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(order_number), $search) \
                 OR string::contains(string::lowercase(customer_info.full_name ?? ''), $search) \
                 OR string::contains(string::lowercase(customer_info.phone ?? ''), $search))",
            );
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("SELECT {FIELDS} FROM {TABLE}{where_clause} ORDER BY created_at DESC");

        let mut query = self.base.db().query(sql);
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str()));
        }
        if let Some(from) = filter.created_from {
            query = query.bind(("from", from));
        }
        if let Some(to) = filter.created_to {
            query = query.bind(("to", to));
        }
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.clone()));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// Orders created in `[from, to)`, oldest first
    pub async fn find_created_between(&self, from: i64, to: i64) -> RepoResult<Vec<Order>> {
        let filter = OrderFilter {
            created_from: Some(from),
            created_to: Some(to),
            ..Default::default()
        };
        let mut orders = self.find_all(&filter).await?;
        orders.reverse();
        Ok(orders)
    }

    /// Every non-cancelled order
    pub async fn find_not_cancelled(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(format!(
                "SELECT {FIELDS} FROM {TABLE} WHERE status != 'cancelled' ORDER BY created_at DESC"
            ))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        self.base.find_one(TABLE, id).await
    }

    /// Find order by its human-facing number
    pub async fn find_by_number(&self, order_number: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT {FIELDS} FROM {TABLE} WHERE order_number = $number LIMIT 1"
            ))
            .bind(("number", order_number.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Find orders by ids, newest first (unknown ids are skipped)
    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Order>> {
        self.base.find_many(TABLE, ids, None).await
    }

    /// Persist a new order
    pub async fn create(&self, record: OrderRecord) -> RepoResult<Order> {
        let id = retry_on_conflict("order insert", || self.base.insert(TABLE, record.clone())).await?;
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Order {id} vanished after create")))
    }

    /// Set a new status unless the order is already cancelled
    ///
    /// Returns `false` when nothing matched: the order is missing or
    /// already cancelled. Callers tell the two apart with a prior read.
    pub async fn set_status_unless_cancelled(
        &self,
        id: &str,
        status: OrderStatus,
        now: i64,
    ) -> RepoResult<bool> {
        retry_on_conflict("order status update", || {
            self.guarded_status_write(id, status, now)
        })
        .await
    }

    async fn guarded_status_write(
        &self,
        id: &str,
        status: OrderStatus,
        now: i64,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, updated_at = $now \
                 WHERE status != 'cancelled' RETURN AFTER",
            )
            .bind(("thing", thing(TABLE, id)))
            .bind(("status", status.as_str()))
            .bind(("now", now))
            .await?;
        let rows: Vec<StatusRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    /// Purge an order (no stock side effects)
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.remove(TABLE, id).await
    }

    /// Totals behind the simple order stats
    pub async fn summary(&self) -> RepoResult<OrderSummary> {
        let count = |condition: &str| {
            format!("SELECT count() AS total FROM {TABLE}{condition} GROUP ALL")
        };

        let total_orders = self.base.count(&count("")).await?;
        let pending_orders = self.base.count(&count(" WHERE status = 'pending'")).await?;
        let delivered_orders = self.base.count(&count(" WHERE status = 'delivered'")).await?;

        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT math::sum(amount) AS total FROM {TABLE} \
                 WHERE status != 'cancelled' GROUP ALL"
            ))
            .await?;
        let sums: Vec<SumRow> = result.take(0)?;
        let total_revenue = sums.first().and_then(|r| r.total).unwrap_or(0.0);

        Ok(OrderSummary {
            total_orders,
            pending_orders,
            delivered_orders,
            total_revenue,
        })
    }
}
