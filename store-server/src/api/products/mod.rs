//! Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Static segments before /{id}
        .route("/stats/product-stats", get(handler::stats))
        .route("/by-ids", post(handler::by_ids))
        .route("/category/{category_id}", get(handler::by_category))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/quantity", patch(handler::update_quantity))
}
