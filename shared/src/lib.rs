//! Shared types for the store backend
//!
//! Error codes, the error response body and the domain vocabulary
//! (order status, delivery type, statistics period, pricing rules) used by
//! the server and by any client talking to it.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
