//! Product Model

use serde::{Deserialize, Serialize};
use shared::models::{final_price, margin_percentage, round2};

use super::Category;

fn default_true() -> bool {
    true
}

/// Product entity (stored fields only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    /// Category id
    pub category: String,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_bundle: bool,
    #[serde(default)]
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Unit price after discount
    pub fn final_price(&self) -> f64 {
        final_price(self.price, self.discount_percentage)
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    pub fn profit(&self) -> f64 {
        self.final_price() - self.cost_price
    }

    pub fn profit_percentage(&self) -> f64 {
        margin_percentage(self.final_price(), self.cost_price)
    }

    pub fn profit_before_discount(&self) -> f64 {
        self.price - self.cost_price
    }

    pub fn profit_percentage_before_discount(&self) -> f64 {
        margin_percentage(self.price, self.cost_price)
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.available_sizes.iter().any(|s| s == size)
    }
}

/// Stored shape
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub price: f64,
    pub cost_price: f64,
    pub discount_percentage: f64,
    pub category: String,
    pub available_sizes: Vec<String>,
    pub colors: Vec<String>,
    pub is_active: bool,
    pub is_bundle: bool,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload
///
/// `images` are base64 data URLs; they are uploaded before the record is
/// written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductCreate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub price: Option<f64>,
    pub cost_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub category: Option<String>,
    pub available_sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub quantity: Option<i64>,
    pub is_bundle: Option<bool>,
}

/// Partial update payload
///
/// `images`, when present, is the complete new image list: hosted URLs are
/// kept, data URLs are uploaded, anything else is dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub price: Option<f64>,
    pub cost_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub category: Option<String>,
    pub available_sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub quantity: Option<i64>,
    pub is_active: Option<bool>,
    pub is_bundle: Option<bool>,
}

/// Validated patch, merged into the stored record
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_sizes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bundle: Option<bool>,
    pub updated_at: i64,
}

/// PATCH /api/products/{id}/quantity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantityUpdate {
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Query parameters of GET /api/products
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Only `"true"` filters; anything else is ignored
    pub in_stock: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl ProductFilter {
    pub fn only_in_stock(&self) -> bool {
        self.in_stock.as_deref() == Some("true")
    }

    pub fn sort_order(&self) -> ProductSort {
        ProductSort::parse_lenient(self.sort.as_deref())
    }
}

/// Product list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductSort {
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "name")]
    Name,
    #[default]
    #[serde(rename = "newest")]
    Newest,
}

impl ProductSort {
    /// Unknown values fall back to `Newest`
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("price-low") => ProductSort::PriceLow,
            Some("price-high") => ProductSort::PriceHigh,
            Some("name") => ProductSort::Name,
            _ => ProductSort::Newest,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            ProductSort::PriceLow => "ORDER BY price ASC",
            ProductSort::PriceHigh => "ORDER BY price DESC",
            ProductSort::Name => "ORDER BY title ASC",
            ProductSort::Newest => "ORDER BY created_at DESC",
        }
    }
}

/// API projection: stored fields + derived figures + resolved category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub price: f64,
    pub cost_price: f64,
    pub discount_percentage: f64,
    pub category_id: String,
    /// `None` when the category was deleted
    pub category: Option<Category>,
    pub available_sizes: Vec<String>,
    pub colors: Vec<String>,
    pub is_active: bool,
    pub is_bundle: bool,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub final_price: f64,
    pub in_stock: bool,
    pub profit: f64,
    pub profit_percentage: f64,
    pub profit_before_discount: f64,
    pub profit_percentage_before_discount: f64,
}

impl ProductView {
    pub fn new(product: Product, category: Option<Category>) -> Self {
        Self {
            final_price: round2(product.final_price()),
            in_stock: product.in_stock(),
            profit: round2(product.profit()),
            profit_percentage: round2(product.profit_percentage()),
            profit_before_discount: round2(product.profit_before_discount()),
            profit_percentage_before_discount: round2(product.profit_percentage_before_discount()),
            id: product.id,
            title: product.title,
            description: product.description,
            images: product.images,
            price: product.price,
            cost_price: product.cost_price,
            discount_percentage: product.discount_percentage,
            category_id: product.category,
            category,
            available_sizes: product.available_sizes,
            colors: product.colors,
            is_active: product.is_active,
            is_bundle: product.is_bundle,
            quantity: product.quantity,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Top-selling entry in the product stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSellingProduct {
    pub product_id: String,
    pub name: String,
    pub total_sold: i64,
    pub total_revenue: f64,
    pub image: Option<String>,
}

/// GET /api/products/stats/product-stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total_products: u64,
    pub out_of_stock: u64,
    pub low_stock: u64,
    pub in_stock: u64,
    pub top_selling: Vec<TopSellingProduct>,
}
