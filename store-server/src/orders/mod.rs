//! 订单工作流 (Order workflow)
//!
//! 下单时校验商品与库存、条件扣减库存、分配订单号；取消时回补库存。
//! 所有库存变动都经过 [`OrderService`]。

pub mod error;
mod service;

pub use error::{OrderError, OrderResult};
pub use service::OrderService;

use chrono_tz::Tz;
use shared::error::AppResult;
use shared::models::OrderStatus;

use crate::db::models::{OrderFilter, OrderQuery};
use crate::utils::time::{parse_lower_bound, parse_upper_bound};

/// Turn list query parameters into a repository filter
///
/// Empty parameters are ignored. Dates are calendar days in `tz` (or
/// RFC 3339 instants); the end date is inclusive of its whole day.
pub fn resolve_filter(query: OrderQuery, tz: Tz) -> AppResult<OrderFilter> {
    let non_empty = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let status = match non_empty(query.status) {
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(|e| OrderError::InvalidStatus(e.0))?,
        ),
        None => None,
    };
    let created_from = non_empty(query.start_date)
        .map(|d| parse_lower_bound(&d, tz))
        .transpose()?;
    let created_to = non_empty(query.end_date)
        .map(|d| parse_upper_bound(&d, tz))
        .transpose()?;

    Ok(OrderFilter {
        status,
        created_from,
        created_to,
        search: non_empty(query.search).map(|s| s.to_lowercase()),
    })
}
