//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::models::{Category, CategoryInput};
use crate::db::repository::CategoryRepository;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppJson, AppResult, ErrorCode};

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, "Category not found")
        .with_detail("category_id", id)
}

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.db.clone());
    Ok(Json(repo.find_all().await?))
}

/// GET /api/categories/{id} - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = validate_required_text(payload.name.as_deref(), "name", MAX_NAME_LEN)?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(name, now_millis()).await?;
    tracing::info!(category_id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CategoryInput>,
) -> AppResult<Json<Category>> {
    let name = validate_required_text(payload.name.as_deref(), "name", MAX_NAME_LEN)?;

    let repo = CategoryRepository::new(state.db.clone());
    if repo.find_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }
    let category = repo.update(&id, name, now_millis()).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id} - 删除分类
///
/// 商品保留原 category id，展示时 category 为 null
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CategoryRepository::new(state.db.clone());
    if !repo.delete(&id).await? {
        return Err(not_found(&id));
    }
    tracing::info!(category_id = %id, "Category deleted");
    Ok(Json(true))
}
