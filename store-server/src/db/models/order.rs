//! Order Model

use serde::{Deserialize, Serialize};
use shared::models::{DeliveryType, OrderStatus};

use super::ProductView;

/// Customer contact block (every field defaults to empty)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub full_name: String,
    pub phone: String,
    pub state: String,
    pub city: String,
    pub delivery_type: DeliveryType,
}

impl CustomerInfo {
    /// Trim every text field
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            state: self.state.trim().to_string(),
            city: self.city.trim().to_string(),
            delivery_type: self.delivery_type,
        }
    }
}

/// Line item as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product id (weak reference)
    pub product: String,
    pub quantity: i64,
    pub size: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    pub items: Vec<OrderItem>,
    /// Snapshot taken at creation, never recomputed
    pub amount: f64,
    #[serde(default)]
    pub delivery_price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_admin_order: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Stored shape
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub order_number: String,
    pub customer_info: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub amount: f64,
    pub delivery_price: f64,
    pub status: OrderStatus,
    pub notes: String,
    pub is_admin_order: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Line item in a create request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderItemInput {
    pub product: String,
    pub quantity: i64,
    pub size: String,
    pub color: Option<String>,
}

/// POST /api/orders
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderCreate {
    pub customer_info: Option<CustomerInfo>,
    pub items: Option<Vec<OrderItemInput>>,
    pub delivery_price: Option<f64>,
    /// Parsed against [`OrderStatus`]; defaults to `pending`
    pub status: Option<String>,
    pub notes: Option<String>,
    pub is_admin_order: Option<bool>,
}

/// PATCH /api/orders/{id}/status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

/// POST /api/orders/by-ids, POST /api/products/by-ids
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdsRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

/// Query parameters of GET /api/orders
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
}

/// Resolved repository filter (millis bounds, lowercase search)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound
    pub created_from: Option<i64>,
    /// Exclusive upper bound
    pub created_to: Option<i64>,
    pub search: Option<String>,
}

/// Line item with its product resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_id: String,
    /// `None` when the product was deleted after the order was placed
    pub product: Option<ProductView>,
    pub quantity: i64,
    pub size: String,
    pub color: Option<String>,
}

/// API projection of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub customer_info: CustomerInfo,
    pub items: Vec<OrderItemView>,
    pub amount: f64,
    pub delivery_price: f64,
    pub status: OrderStatus,
    pub notes: String,
    pub is_admin_order: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Aggregates behind GET /api/orders/stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub delivered_orders: u64,
    /// Σ amount over non-cancelled orders
    pub total_revenue: f64,
}
