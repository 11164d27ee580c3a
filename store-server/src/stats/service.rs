//! Statistics aggregation
//!
//! Orders are loaded per range and folded in memory; the fold itself
//! ([`build_report`], [`top_selling`]) is pure.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use shared::error::AppResult;
use shared::models::{OrderStatus, StatsPeriod, round2, trailing_days};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{AdvancedStats, DailySales, OrderStats, StatusCount};
use crate::db::models::{Order, Product, ProductStats, TopSellingProduct};
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::utils::time::{date_of_millis, day_start_millis, today};

/// Entries in the top-selling list
pub const TOP_SELLING_LIMIT: usize = 5;

#[derive(Clone)]
pub struct StatsService {
    orders: OrderRepository,
    products: ProductRepository,
    tz: Tz,
}

impl StatsService {
    pub fn new(db: Surreal<Db>, tz: Tz) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
            tz,
        }
    }

    /// Order counts and revenue over all time
    pub async fn summary(&self) -> AppResult<OrderStats> {
        let summary = self.orders.summary().await?;
        let average_order_value = if summary.total_orders > 0 {
            summary.total_revenue / summary.total_orders as f64
        } else {
            0.0
        };
        Ok(OrderStats {
            total_orders: summary.total_orders,
            pending_orders: summary.pending_orders,
            delivered_orders: summary.delivered_orders,
            total_revenue: summary.total_revenue,
            average_order_value,
        })
    }

    /// Financial report for a calendar period in the store timezone
    pub async fn advanced(&self, period: StatsPeriod) -> AppResult<AdvancedStats> {
        let today = today(self.tz);

        let (start, end) = period.date_bounds(today);
        let in_period = self
            .orders
            .find_created_between(day_start_millis(start, self.tz), day_start_millis(end, self.tz))
            .await?;

        let days = trailing_days(today);
        let first_day = days.first().copied().unwrap_or(today);
        let trailing = self
            .orders
            .find_created_between(
                day_start_millis(first_day, self.tz),
                day_start_millis(today + Duration::days(1), self.tz),
            )
            .await?;

        let mut ids: Vec<String> = in_period
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        let products = self.products.find_map(&ids).await?;

        tracing::debug!(
            period = period.as_str(),
            orders = in_period.len(),
            "Advanced stats computed"
        );
        Ok(build_report(
            period, &in_period, &trailing, &products, today, self.tz,
        ))
    }

    /// Stock distribution and best sellers
    pub async fn product_stats(&self) -> AppResult<ProductStats> {
        let counts = self.products.stock_counts().await?;

        let orders = self.orders.find_not_cancelled().await?;
        let mut ids: Vec<String> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        let products = self.products.find_map(&ids).await?;

        Ok(ProductStats {
            total_products: counts.total,
            out_of_stock: counts.out_of_stock,
            low_stock: counts.low_stock,
            in_stock: counts.in_stock,
            top_selling: top_selling(&orders, &products, TOP_SELLING_LIMIT),
        })
    }
}

/// Fold the period's orders into a report
///
/// `in_period` drives the totals and status counts; `trailing` (the last
/// seven days) drives `daily_sales`. Cancelled orders only appear in the
/// status counts. Items whose product no longer exists cost nothing.
pub fn build_report(
    period: StatsPeriod,
    in_period: &[Order],
    trailing: &[Order],
    products: &HashMap<String, Product>,
    today: NaiveDate,
    tz: Tz,
) -> AdvancedStats {
    let mut revenue = 0.0;
    let mut total_orders = 0u64;
    let mut total_cost = 0.0;
    let mut total_delivery_cost = 0.0;
    let mut by_status: HashMap<OrderStatus, u64> = HashMap::new();

    for order in in_period {
        *by_status.entry(order.status).or_default() += 1;
        if order.status.is_cancelled() {
            continue;
        }
        total_orders += 1;
        revenue += order.amount;
        total_delivery_cost += order.delivery_price;
        total_cost += order
            .items
            .iter()
            .filter_map(|item| {
                products
                    .get(&item.product)
                    .map(|p| p.cost_price * item.quantity as f64)
            })
            .sum::<f64>();
    }

    let average_order_value = if total_orders > 0 {
        revenue / total_orders as f64
    } else {
        0.0
    };
    let net_profit = revenue - total_cost - total_delivery_cost;
    let profit_margin = if revenue > 0.0 {
        round2(net_profit / revenue * 100.0)
    } else {
        0.0
    };

    let order_status_stats = OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: by_status.get(&status).copied().unwrap_or(0),
        })
        .collect();

    AdvancedStats {
        period,
        revenue,
        total_orders,
        average_order_value,
        total_cost,
        total_delivery_cost,
        net_profit,
        profit_margin,
        daily_sales: daily_sales(trailing, today, tz),
        order_status_stats,
    }
}

/// Seven zero-filled days ending today, oldest first
fn daily_sales(orders: &[Order], today: NaiveDate, tz: Tz) -> Vec<DailySales> {
    let mut buckets: HashMap<NaiveDate, (f64, u64)> = HashMap::new();
    for order in orders.iter().filter(|o| !o.status.is_cancelled()) {
        if let Some(day) = date_of_millis(order.created_at, tz) {
            let bucket = buckets.entry(day).or_default();
            bucket.0 += order.amount;
            bucket.1 += 1;
        }
    }

    trailing_days(today)
        .into_iter()
        .map(|day| {
            let (revenue, orders) = buckets.get(&day).copied().unwrap_or_default();
            DailySales {
                date: day.format("%Y-%m-%d").to_string(),
                revenue,
                orders,
            }
        })
        .collect()
}

/// Best sellers by units over the given (non-cancelled) orders
///
/// Revenue is units × the product's current final price. Products that no
/// longer exist are left out.
pub fn top_selling(
    orders: &[Order],
    products: &HashMap<String, Product>,
    limit: usize,
) -> Vec<TopSellingProduct> {
    let mut units: HashMap<&str, i64> = HashMap::new();
    for order in orders.iter().filter(|o| !o.status.is_cancelled()) {
        for item in &order.items {
            *units.entry(item.product.as_str()).or_default() += item.quantity;
        }
    }

    let mut ranked: Vec<TopSellingProduct> = units
        .into_iter()
        .filter_map(|(id, total_sold)| {
            let product = products.get(id)?;
            Some(TopSellingProduct {
                product_id: id.to_string(),
                name: product.title.clone(),
                total_sold,
                total_revenue: round2(total_sold as f64 * product.final_price()),
                image: product.images.first().cloned(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_sold
            .cmp(&a.total_sold)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}
