//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Testimonial errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a plain `u16` so clients can branch on it without parsing
/// the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderItemsRequired = 4002,
    /// Order is already cancelled
    OrderAlreadyCancelled = 4003,
    /// Status value is not one of the known statuses
    InvalidOrderStatus = 4004,
    /// Cancelled orders cannot move to another status
    OrderCancelledTerminal = 4005,
    /// Line item quantity must be at least 1
    InvalidItemQuantity = 4006,
    /// Delivery price must not be negative
    InvalidDeliveryPrice = 4007,
    /// Line item references a product that does not exist
    OrderItemProductNotFound = 4008,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is not active
    ProductInactive = 6002,
    /// Not enough stock for the requested quantity
    InsufficientStock = 6003,
    /// Requested size is not offered for the product
    InvalidSize = 6004,
    /// Stock quantity is invalid
    InvalidQuantity = 6005,
    /// Category not found
    CategoryNotFound = 6101,
    /// Image could not be uploaded
    ImageUploadFailed = 6201,
    /// Image payload is not a base64 data URL
    InvalidImage = 6202,

    // ==================== 7xxx: Testimonial ====================
    /// Testimonial not found
    TestimonialNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Image hosting service error
    ImageServiceError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Operation timed out
    TimeoutError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemsRequired => "Order items are required",
            ErrorCode::OrderAlreadyCancelled => "Order is already cancelled",
            ErrorCode::InvalidOrderStatus => "Invalid order status",
            ErrorCode::OrderCancelledTerminal => "Cancelled orders cannot change status",
            ErrorCode::InvalidItemQuantity => "Item quantity must be at least 1",
            ErrorCode::InvalidDeliveryPrice => "Delivery price must not be negative",
            ErrorCode::OrderItemProductNotFound => "Order item references an unknown product",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInactive => "Product is not available",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidSize => "Invalid size for product",
            ErrorCode::InvalidQuantity => "Invalid stock quantity",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::ImageUploadFailed => "Failed to upload images",
            ErrorCode::InvalidImage => "Invalid base64 image format",

            // Testimonial
            ErrorCode::TestimonialNotFound => "Testimonial not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ImageServiceError => "Image service error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderItemsRequired),
            4003 => Ok(ErrorCode::OrderAlreadyCancelled),
            4004 => Ok(ErrorCode::InvalidOrderStatus),
            4005 => Ok(ErrorCode::OrderCancelledTerminal),
            4006 => Ok(ErrorCode::InvalidItemQuantity),
            4007 => Ok(ErrorCode::InvalidDeliveryPrice),
            4008 => Ok(ErrorCode::OrderItemProductNotFound),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInactive),
            6003 => Ok(ErrorCode::InsufficientStock),
            6004 => Ok(ErrorCode::InvalidSize),
            6005 => Ok(ErrorCode::InvalidQuantity),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6201 => Ok(ErrorCode::ImageUploadFailed),
            6202 => Ok(ErrorCode::InvalidImage),

            // Testimonial
            7001 => Ok(ErrorCode::TestimonialNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ImageServiceError),
            9004 => Ok(ErrorCode::ConfigError),
            9005 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
