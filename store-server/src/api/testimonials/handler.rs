//! Testimonial API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::Gender;

use crate::core::ServerState;
use crate::db::models::{
    Testimonial, TestimonialCreate, TestimonialPatch, TestimonialRecord, TestimonialStats,
    TestimonialUpdate,
};
use crate::db::repository::TestimonialRepository;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppJson, AppResult, ErrorCode};

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::TestimonialNotFound, "Testimonial not found")
        .with_detail("testimonial_id", id)
}

fn parse_gender(value: Option<&str>) -> AppResult<Gender> {
    let value = validate_required_text(value, "gender", MAX_NAME_LEN)?;
    value
        .parse::<Gender>()
        .map_err(|msg| AppError::validation(msg).with_detail("field", "gender"))
}

fn validate_create(payload: TestimonialCreate, now: i64) -> AppResult<TestimonialRecord> {
    Ok(TestimonialRecord {
        customer_name: validate_required_text(
            payload.customer_name.as_deref(),
            "customer_name",
            MAX_NAME_LEN,
        )?,
        comment: validate_required_text(payload.comment.as_deref(), "comment", MAX_NOTE_LEN)?,
        gender: parse_gender(payload.gender.as_deref())?,
        created_at: now,
        updated_at: now,
    })
}

/// Supplied fields follow the create rules; absent ones are left alone
fn validate_update(payload: TestimonialUpdate, now: i64) -> AppResult<TestimonialPatch> {
    let mut patch = TestimonialPatch {
        updated_at: now,
        ..Default::default()
    };
    if payload.customer_name.is_some() {
        patch.customer_name = Some(validate_required_text(
            payload.customer_name.as_deref(),
            "customer_name",
            MAX_NAME_LEN,
        )?);
    }
    if payload.comment.is_some() {
        patch.comment = Some(validate_required_text(
            payload.comment.as_deref(),
            "comment",
            MAX_NOTE_LEN,
        )?);
    }
    if payload.gender.is_some() {
        patch.gender = Some(parse_gender(payload.gender.as_deref())?);
    }
    Ok(patch)
}

/// GET /api/testimonials - 获取评价列表 (最新在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Testimonial>>> {
    let repo = TestimonialRepository::new(state.db.clone());
    Ok(Json(repo.find_all().await?))
}

/// GET /api/testimonials/{id} - 获取单条评价
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Testimonial>> {
    let repo = TestimonialRepository::new(state.db.clone());
    let testimonial = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(testimonial))
}

/// POST /api/testimonials - 创建评价
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<TestimonialCreate>,
) -> AppResult<(StatusCode, Json<Testimonial>)> {
    let record = validate_create(payload, now_millis())?;
    let repo = TestimonialRepository::new(state.db.clone());
    let testimonial = repo.create(record).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// PUT /api/testimonials/{id} - 更新评价 (部分字段)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TestimonialUpdate>,
) -> AppResult<Json<Testimonial>> {
    let patch = validate_update(payload, now_millis())?;
    let repo = TestimonialRepository::new(state.db.clone());
    if repo.find_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }
    Ok(Json(repo.update(&id, patch).await?))
}

/// DELETE /api/testimonials/{id} - 删除评价
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = TestimonialRepository::new(state.db.clone());
    if !repo.delete(&id).await? {
        return Err(not_found(&id));
    }
    Ok(Json(true))
}

/// GET /api/testimonials/stats - 评价统计
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<TestimonialStats>> {
    let repo = TestimonialRepository::new(state.db.clone());
    Ok(Json(repo.stats().await?))
}
