//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::StatsPeriod;

use crate::core::ServerState;
use crate::db::models::{IdsRequest, OrderCreate, OrderQuery, OrderView, StatusUpdate};
use crate::orders::{OrderError, resolve_filter};
use crate::stats::{AdvancedStats, OrderStats};
use crate::utils::validation::validate_id_list;
use crate::utils::{AppJson, AppResult};

/// Query of GET /api/orders/stats/advanced
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

/// GET /api/orders - 获取订单列表 (最新在前)
///
/// Query: status, start_date, end_date, search
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<OrderView>>> {
    let filter = resolve_filter(query, state.config.timezone)?;
    Ok(Json(state.orders.list(&filter).await?))
}

/// GET /api/orders/{id} - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.orders.get(&id).await?))
}

/// GET /api/orders/number/{order_number} - 按订单号获取
pub async fn get_by_number(
    State(state): State<ServerState>,
    Path(order_number): Path<String>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.orders.get_by_number(order_number.trim()).await?))
}

/// POST /api/orders/by-ids - 批量获取订单
pub async fn by_ids(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<IdsRequest>,
) -> AppResult<Json<Vec<OrderView>>> {
    let ids = validate_id_list(payload.ids)?;
    Ok(Json(state.orders.get_by_ids(&ids).await?))
}

/// POST /api/orders - 下单 (扣减库存)
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderView>)> {
    let order = state.orders.create(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/orders/{id}/status - 更新订单状态
///
/// 改为 cancelled 等同于取消 (回补库存)；已取消订单不可恢复
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<StatusUpdate>,
) -> AppResult<Json<OrderView>> {
    let status = payload
        .status
        .ok_or_else(|| OrderError::InvalidStatus("status is required".into()))?;
    Ok(Json(state.orders.update_status(&id, &status).await?))
}

/// PATCH /api/orders/{id}/cancel - 取消订单 (回补库存)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.orders.cancel(&id).await?))
}

/// DELETE /api/orders/{id} - 清除订单 (不回补库存)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.orders.delete(&id).await?;
    Ok(Json(true))
}

/// GET /api/orders/stats - 简单订单统计
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<OrderStats>> {
    Ok(Json(state.stats.summary().await?))
}

/// GET /api/orders/stats/advanced?period=today|week|month|year - 区间报表
pub async fn advanced_stats(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<AdvancedStats>> {
    let period = StatsPeriod::parse_lenient(query.period.as_deref());
    Ok(Json(state.stats.advanced(period).await?))
}
