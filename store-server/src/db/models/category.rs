//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Stored shape
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRecord {
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / update payload (name required)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: Option<String>,
}
