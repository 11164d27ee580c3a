//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::models::{
    IdsRequest, ProductCreate, ProductFilter, ProductStats, ProductUpdate, ProductView,
    QuantityUpdate,
};
use crate::utils::validation::validate_id_list;
use crate::utils::{AppJson, AppResult};

/// GET /api/products - 获取商品列表 (仅上架商品)
///
/// Query: category, search, min_price, max_price, in_stock, size, sort, limit
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<ProductView>>> {
    Ok(Json(state.products.list(&filter).await?))
}

/// GET /api/products/{id} - 获取单个商品 (含已下架)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductView>> {
    Ok(Json(state.products.get(&id).await?))
}

/// POST /api/products - 创建商品 (上传图片)
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let product = state.products.create(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductUpdate>,
) -> AppResult<Json<ProductView>> {
    Ok(Json(state.products.update(&id, payload).await?))
}

/// DELETE /api/products/{id} - 删除商品 (同时删除托管图片)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.products.delete(&id).await?;
    Ok(Json(true))
}

/// PATCH /api/products/{id}/quantity - 设置库存
pub async fn update_quantity(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<QuantityUpdate>,
) -> AppResult<Json<ProductView>> {
    Ok(Json(state.products.set_quantity(&id, payload.quantity).await?))
}

/// GET /api/products/category/{category_id} - 分类下有货的商品
pub async fn by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> AppResult<Json<Vec<ProductView>>> {
    Ok(Json(state.products.by_category(&category_id).await?))
}

/// POST /api/products/by-ids - 批量获取商品
pub async fn by_ids(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<IdsRequest>,
) -> AppResult<Json<Vec<ProductView>>> {
    let ids = validate_id_list(payload.ids)?;
    Ok(Json(state.products.by_ids(&ids).await?))
}

/// GET /api/products/stats/product-stats - 库存分布与热销商品
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<ProductStats>> {
    Ok(Json(state.stats.product_stats().await?))
}
