//! Order workflow errors

use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order items are required")]
    MissingItems,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product is not available: {0}")]
    ProductInactive(String),

    #[error("Insufficient stock for product: {title}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        title: String,
        available: i64,
        requested: i64,
    },

    #[error("Invalid size {size} for product {title}. Available sizes: {}", .available.join(", "))]
    InvalidSize {
        title: String,
        size: String,
        available: Vec<String>,
    },

    #[error("Item quantity must be at least 1 (got {0})")]
    InvalidQuantity(i64),

    #[error("Delivery price must not be negative (got {0})")]
    InvalidDeliveryPrice(f64),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Cancelled order cannot be moved to {0}")]
    ReopenCancelled(OrderStatus),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::MissingItems => AppError::with_message(ErrorCode::OrderItemsRequired, message),
            // Unknown product in a line item is a 400
            OrderError::ProductNotFound(id) => {
                AppError::with_message(ErrorCode::OrderItemProductNotFound, message)
                    .with_detail("product_id", id)
            }
            OrderError::ProductInactive(title) => {
                AppError::with_message(ErrorCode::ProductInactive, message).with_detail("title", title)
            }
            OrderError::InsufficientStock {
                title,
                available,
                requested,
            } => AppError::with_message(ErrorCode::InsufficientStock, message)
                .with_detail("title", title)
                .with_detail("available", available)
                .with_detail("requested", requested),
            OrderError::InvalidSize {
                title, available, ..
            } => AppError::with_message(ErrorCode::InvalidSize, message)
                .with_detail("title", title)
                .with_detail("available_sizes", available),
            OrderError::InvalidQuantity(_) => {
                AppError::with_message(ErrorCode::InvalidItemQuantity, message)
            }
            OrderError::InvalidDeliveryPrice(_) => {
                AppError::with_message(ErrorCode::InvalidDeliveryPrice, message)
            }
            OrderError::InvalidStatus(_) => AppError::with_message(ErrorCode::InvalidOrderStatus, message),
            OrderError::AlreadyCancelled => {
                AppError::with_message(ErrorCode::OrderAlreadyCancelled, message)
            }
            OrderError::ReopenCancelled(_) => {
                AppError::with_message(ErrorCode::OrderCancelledTerminal, message)
            }
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, "Order not found").with_detail("order_id", id)
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}
