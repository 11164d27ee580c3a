//! Order workflow engine
//!
//! # 下单流程
//!
//! ```text
//! validate (全部 item 预检, 不写库)
//!     ↓
//! reserve   (逐个条件扣减库存, 失败则回补已扣部分)
//!     ↓
//! number    (counter:order_number 原子自增)
//!     ↓
//! persist   (写订单, 失败则回补全部库存)
//! ```
//!
//! 取消订单先用带条件的状态更新抢占 (`status != cancelled`)，只有抢占成功的
//! 调用方回补库存，因此并发取消也只会回补一次。

use std::collections::{HashMap, HashSet};

use shared::models::{OrderStatus, format_order_number, line_total};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::error::{OrderError, OrderResult};
use crate::catalog::attach_categories;
use crate::db::models::{
    Order, OrderCreate, OrderFilter, OrderItem, OrderItemView, OrderRecord, OrderView, Product,
    ProductView,
};
use crate::db::repository::counter::ORDER_NUMBER_SEQUENCE;
use crate::db::repository::{
    CategoryRepository, CounterRepository, OrderRepository, ProductRepository,
};
use crate::utils::time::now_millis;

/// Attempts per compensating stock write
const RESTORE_ATTEMPTS: usize = 3;

/// An order request that passed validation
#[derive(Debug, Clone)]
struct ValidatedOrder {
    record: OrderRecord,
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    products: ProductRepository,
    categories: CategoryRepository,
    counter: CounterRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            counter: CounterRepository::new(db),
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Validate, reserve stock, number and persist a new order
    pub async fn create(&self, input: OrderCreate) -> OrderResult<OrderView> {
        let now = now_millis();
        let ValidatedOrder { mut record } = self.validate(input, now).await?;

        self.reserve_stock(&record.items, now).await?;

        let sequence = match self.counter.next(ORDER_NUMBER_SEQUENCE).await {
            Ok(seq) => seq,
            Err(e) => {
                self.restore_stock(&record.items, "order number allocation failed").await;
                return Err(e.into());
            }
        };
        record.order_number = format_order_number(sequence);

        let items = record.items.clone();
        let order = match self.orders.create(record).await {
            Ok(order) => order,
            Err(e) => {
                self.restore_stock(&items, "order insert failed").await;
                return Err(e.into());
            }
        };

        tracing::info!(
            order_number = %order.order_number,
            items = order.items.len(),
            amount = order.amount,
            "Order created"
        );
        self.view(order).await
    }

    /// Fail-fast validation; nothing is written
    async fn validate(&self, input: OrderCreate, now: i64) -> OrderResult<ValidatedOrder> {
        let items = match input.items {
            Some(items) if !items.is_empty() => items,
            _ => return Err(OrderError::MissingItems),
        };

        let delivery_price = input.delivery_price.unwrap_or(0.0);
        if !(delivery_price >= 0.0) {
            return Err(OrderError::InvalidDeliveryPrice(delivery_price));
        }

        let status = match input.status.as_deref() {
            None => OrderStatus::Pending,
            Some(raw) => raw
                .parse::<OrderStatus>()
                .map_err(|e| OrderError::InvalidStatus(e.0))?,
        };
        if status.is_cancelled() {
            return Err(OrderError::InvalidStatus(
                "an order cannot be created as cancelled".into(),
            ));
        }

        let ids: Vec<String> = unique(items.iter().map(|i| i.product.clone()));
        let products = self.products.find_map(&ids).await?;

        let mut amount = 0.0;
        let mut validated = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity < 1 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            let product = products
                .get(&item.product)
                .ok_or_else(|| OrderError::ProductNotFound(item.product.clone()))?;
            if !product.is_active {
                return Err(OrderError::ProductInactive(product.title.clone()));
            }
            if product.quantity < item.quantity {
                return Err(OrderError::InsufficientStock {
                    title: product.title.clone(),
                    available: product.quantity,
                    requested: item.quantity,
                });
            }
            if !product.has_size(&item.size) {
                return Err(OrderError::InvalidSize {
                    title: product.title.clone(),
                    size: item.size.clone(),
                    available: product.available_sizes.clone(),
                });
            }

            amount += line_total(product.price, product.discount_percentage, item.quantity);
            validated.push(OrderItem {
                product: item.product,
                quantity: item.quantity,
                size: item.size,
                color: item.color.filter(|c| !c.trim().is_empty()),
            });
        }

        Ok(ValidatedOrder {
            record: OrderRecord {
                order_number: String::new(),
                customer_info: input.customer_info.unwrap_or_default().normalized(),
                items: validated,
                amount,
                delivery_price,
                status,
                notes: input.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
                is_admin_order: input.is_admin_order.unwrap_or(false),
                created_at: now,
                updated_at: now,
            },
        })
    }

    /// Take stock for every item, all or nothing
    async fn reserve_stock(&self, items: &[OrderItem], now: i64) -> OrderResult<()> {
        for (index, item) in items.iter().enumerate() {
            let taken = match self.products.try_decrement(&item.product, item.quantity, now).await {
                Ok(taken) => taken,
                Err(e) => {
                    self.restore_stock(&items[..index], "stock reservation failed").await;
                    return Err(e.into());
                }
            };
            if taken.is_some() {
                continue;
            }

            // Stock moved since validation (concurrent order or deactivation)
            self.restore_stock(&items[..index], "stock reservation lost a race").await;
            let current = self.products.find_by_id(&item.product).await?;
            return Err(match current {
                None => OrderError::ProductNotFound(item.product.clone()),
                Some(p) if !p.is_active => OrderError::ProductInactive(p.title),
                Some(p) => OrderError::InsufficientStock {
                    title: p.title,
                    available: p.quantity,
                    requested: item.quantity,
                },
            });
        }
        Ok(())
    }

    /// Compensate reserved stock; failures are logged, never propagated
    async fn restore_stock(&self, items: &[OrderItem], reason: &str) {
        for item in items {
            let mut restored = false;
            for attempt in 1..=RESTORE_ATTEMPTS {
                match self
                    .products
                    .increment(&item.product, item.quantity, now_millis())
                    .await
                {
                    Ok(_) => {
                        restored = true;
                        break;
                    }
                    Err(e) => tracing::warn!(
                        product_id = %item.product,
                        attempt,
                        error = %e,
                        "Stock compensation attempt failed"
                    ),
                }
            }
            if !restored {
                tracing::error!(
                    product_id = %item.product,
                    quantity = item.quantity,
                    reason,
                    "Stock compensation failed, product stock is short"
                );
            }
        }
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Cancel an order and give its stock back
    pub async fn cancel(&self, id: &str) -> OrderResult<OrderView> {
        let order = self.find(id).await?;
        if order.status.is_cancelled() {
            return Err(OrderError::AlreadyCancelled);
        }

        let now = now_millis();
        if !self
            .orders
            .set_status_unless_cancelled(id, OrderStatus::Cancelled, now)
            .await?
        {
            // Another request cancelled (or purged) it first
            return match self.orders.find_by_id(id).await? {
                Some(_) => Err(OrderError::AlreadyCancelled),
                None => Err(OrderError::OrderNotFound(id.to_string())),
            };
        }

        self.restore_cancelled(&order, now).await?;

        tracing::info!(order_number = %order.order_number, "Order cancelled");
        let cancelled = self.find(id).await?;
        self.view(cancelled).await
    }

    /// Return stock for every line of a cancelled order
    ///
    /// Missing products are skipped. The status is already `cancelled`, so
    /// a failure here is never applied twice; it is logged with the order
    /// number and reported to the caller.
    async fn restore_cancelled(&self, order: &Order, now: i64) -> OrderResult<()> {
        let mut first_error = None;
        for item in &order.items {
            match self.products.increment(&item.product, item.quantity, now).await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::debug!(
                    order_number = %order.order_number,
                    product_id = %item.product,
                    "Product gone, nothing to restore"
                ),
                Err(e) => {
                    tracing::error!(
                        order_number = %order.order_number,
                        product_id = %item.product,
                        quantity = item.quantity,
                        error = %e,
                        "Failed to restore stock for cancelled order"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Move an order to another status
    ///
    /// Entering `cancelled` goes through [`Self::cancel`] so stock is
    /// restored exactly once; leaving `cancelled` is rejected.
    pub async fn update_status(&self, id: &str, status: &str) -> OrderResult<OrderView> {
        let target = status
            .trim()
            .parse::<OrderStatus>()
            .map_err(|e| OrderError::InvalidStatus(e.0))?;

        if target.is_cancelled() {
            return self.cancel(id).await;
        }

        let order = self.find(id).await?;
        if order.status.is_cancelled() {
            return Err(OrderError::ReopenCancelled(target));
        }

        if !self
            .orders
            .set_status_unless_cancelled(id, target, now_millis())
            .await?
        {
            return match self.orders.find_by_id(id).await? {
                Some(_) => Err(OrderError::ReopenCancelled(target)),
                None => Err(OrderError::OrderNotFound(id.to_string())),
            };
        }

        tracing::info!(
            order_number = %order.order_number,
            from = %order.status,
            to = %target,
            "Order status updated"
        );
        let updated = self.find(id).await?;
        self.view(updated).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<OrderView>> {
        let orders = self.orders.find_all(filter).await?;
        self.views(orders).await
    }

    pub async fn get(&self, id: &str) -> OrderResult<OrderView> {
        let order = self.find(id).await?;
        self.view(order).await
    }

    pub async fn get_by_number(&self, order_number: &str) -> OrderResult<OrderView> {
        let order = self
            .orders
            .find_by_number(order_number)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_number.to_string()))?;
        self.view(order).await
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> OrderResult<Vec<OrderView>> {
        let orders = self.orders.find_by_ids(ids).await?;
        self.views(orders).await
    }

    /// Administrative purge: no stock is restored
    pub async fn delete(&self, id: &str) -> OrderResult<()> {
        if !self.orders.delete(id).await? {
            return Err(OrderError::OrderNotFound(id.to_string()));
        }
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn find(&self, id: &str) -> OrderResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))
    }

    // ========================================================================
    // Projection
    // ========================================================================

    async fn view(&self, order: Order) -> OrderResult<OrderView> {
        let mut views = self.views(vec![order]).await?;
        views
            .pop()
            .ok_or_else(|| OrderError::OrderNotFound("projection".into()))
    }

    /// Resolve line item products (and their categories) for display
    async fn views(&self, orders: Vec<Order>) -> OrderResult<Vec<OrderView>> {
        let ids = unique(
            orders
                .iter()
                .flat_map(|o| o.items.iter().map(|i| i.product.clone())),
        );
        let products: Vec<Product> = self.products.find_by_ids(&ids, false).await?;
        let products: HashMap<String, ProductView> = attach_categories(&self.categories, products)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| project(order, &products))
            .collect())
    }
}

fn project(order: Order, products: &HashMap<String, ProductView>) -> OrderView {
    OrderView {
        items: order
            .items
            .into_iter()
            .map(|item| OrderItemView {
                product: products.get(&item.product).cloned(),
                product_id: item.product,
                quantity: item.quantity,
                size: item.size,
                color: item.color,
            })
            .collect(),
        id: order.id,
        order_number: order.order_number,
        customer_info: order.customer_info,
        amount: order.amount,
        delivery_price: order.delivery_price,
        status: order.status,
        notes: order.notes,
        is_admin_order: order.is_admin_order,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// Distinct values, first occurrence order
fn unique(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}
