//! Testimonial Model

use serde::{Deserialize, Serialize};
use shared::models::Gender;

/// Customer testimonial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub customer_name: String,
    pub comment: String,
    pub gender: Gender,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestimonialRecord {
    pub customer_name: String,
    pub comment: String,
    pub gender: Gender,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialCreate {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialUpdate {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Validated patch, merged into the stored record
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestimonialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub updated_at: i64,
}

/// Most recent testimonial in the stats summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestTestimonial {
    pub customer_name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenderStats {
    pub male: u64,
    pub female: u64,
}

/// GET /api/testimonials/stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialStats {
    pub total: u64,
    pub gender_stats: GenderStats,
    pub latest: Option<LatestTestimonial>,
}
