//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`categories`] - 分类管理接口
//! - [`products`] - 商品管理接口 (含图片、库存、商品统计)
//! - [`orders`] - 订单管理接口 (含下单、取消、统计)
//! - [`testimonials`] - 客户评价接口

pub mod health;

// Data model APIs
pub mod categories;
pub mod orders;
pub mod products;
pub mod testimonials;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppJson, AppResult};

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(testimonials::router())
}
