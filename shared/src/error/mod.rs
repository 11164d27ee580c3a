//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message and optional details
//! - [`ErrorBody`]: JSON body returned for every failed request
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors (products, categories, images)
//! - 7xxx: Testimonial errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorBody};
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Not enough stock")
//!     .with_detail("available", 5)
//!     .with_detail("requested", 6);
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 6003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
