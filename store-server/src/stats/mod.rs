//! 统计模块 (Statistics)
//!
//! - 简单订单统计: 订单数 / 营收 / 客单价
//! - 区间报表: 营收、成本、运费、净利润、近 7 天日销售、各状态订单数
//! - 商品统计: 库存分布 + 热销商品
//!
//! 区间边界按店铺时区计算 (see [`crate::utils::time`])。

mod service;

pub use service::{StatsService, build_report, top_selling};

use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, StatsPeriod};

/// GET /api/orders/stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub delivered_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

/// One calendar day in the sales breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    /// `YYYY-MM-DD` in the store timezone
    pub date: String,
    pub revenue: f64,
    pub orders: u64,
}

/// Orders in a given status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// GET /api/orders/stats/advanced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedStats {
    pub period: StatsPeriod,
    pub revenue: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub total_cost: f64,
    pub total_delivery_cost: f64,
    pub net_profit: f64,
    /// Percent of revenue, two decimals
    pub profit_margin: f64,
    pub daily_sales: Vec<DailySales>,
    pub order_status_stats: Vec<StatusCount>,
}
