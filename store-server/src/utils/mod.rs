//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`AppJson`] - 请求体提取器，解析失败返回统一错误体
//! - 日志、时间、输入校验

pub mod error;
pub mod extract;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
pub use extract::AppJson;
