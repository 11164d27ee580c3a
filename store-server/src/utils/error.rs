//! 统一错误处理
//!
//! 错误类型全部来自 `shared::error`，本模块只做 re-export，
//! 各层错误 (`RepoError`, `OrderError`, `ImageError`) 通过 `From` 转换为 [`AppError`]。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order"))
//!
//! // 带详情的业务错误
//! Err(AppError::with_message(ErrorCode::InsufficientStock, "Insufficient stock")
//!     .with_detail("available", 5))
//! ```

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
