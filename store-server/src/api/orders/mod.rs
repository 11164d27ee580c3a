//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | GET / POST | 列表 (过滤) / 下单 |
//! | /api/orders/stats | GET | 简单统计 |
//! | /api/orders/stats/advanced | GET | 区间报表 (?period=) |
//! | /api/orders/by-ids | POST | 批量获取 |
//! | /api/orders/number/{order_number} | GET | 按订单号获取 |
//! | /api/orders/{id} | GET / DELETE | 获取 / 清除 |
//! | /api/orders/{id}/status | PATCH | 更新状态 |
//! | /api/orders/{id}/cancel | PATCH | 取消 (回补库存) |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Static segments before /{id}
        .route("/stats", get(handler::stats))
        .route("/stats/advanced", get(handler::advanced_stats))
        .route("/by-ids", post(handler::by_ids))
        .route("/number/{order_number}", get(handler::get_by_number))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/cancel", patch(handler::cancel))
}
