//! Order vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of every human-facing order number
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Number of zero-padded digits after the prefix
pub const ORDER_NUMBER_DIGITS: usize = 6;

/// Order status
///
/// `Pending` is the initial state; `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a status string outside the enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct InvalidOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidOrderStatus(s.to_string()))
    }
}

/// Delivery destination chosen by the customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeliveryType {
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "office")]
    Office,
    /// Not specified (back-office orders often omit it)
    #[default]
    #[serde(rename = "")]
    Unset,
}

/// Format a sequence value as an order number (`ORD000001`)
pub fn format_order_number(sequence: u64) -> String {
    format!(
        "{ORDER_NUMBER_PREFIX}{sequence:0width$}",
        width = ORDER_NUMBER_DIGITS
    )
}

/// Parse the sequence value back out of an order number
pub fn parse_order_number(number: &str) -> Option<u64> {
    let digits = number.strip_prefix(ORDER_NUMBER_PREFIX)?;
    if digits.len() < ORDER_NUMBER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
