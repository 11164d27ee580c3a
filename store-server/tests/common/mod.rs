//! Shared fixtures: a fresh RocksDB database per test and seeding helpers

#![allow(dead_code)]

use std::sync::Arc;

use store_server::db::DbService;
use store_server::db::models::{
    CustomerInfo, OrderCreate, OrderItemInput, Product, ProductRecord,
};
use store_server::db::repository::{CategoryRepository, ProductRepository};
use store_server::images::MemoryImageStore;
use store_server::utils::time::now_millis;
use store_server::{Config, ServerState};
use tempfile::TempDir;

pub struct TestEnv {
    /// Keeps the database directory alive for the duration of the test
    _dir: TempDir,
    pub state: ServerState,
    pub images: Arc<MemoryImageStore>,
    pub category_id: String,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
        config.timezone = chrono_tz::UTC;

        let db_path = config.database_dir();
        std::fs::create_dir_all(&db_path).expect("database dir");
        let db = DbService::new(db_path.to_str().expect("utf-8 path"), "test", "test")
            .await
            .expect("open database");

        let images = Arc::new(MemoryImageStore::new());
        let state = ServerState::with_parts(config, db.db, images.clone());

        let category = CategoryRepository::new(state.db.clone())
            .create("Pajamas".into(), now_millis())
            .await
            .expect("seed category");

        Self {
            _dir: dir,
            state,
            images,
            category_id: category.id,
        }
    }

    /// Active product with sizes S/M/L and cost at half the price
    pub async fn product(&self, title: &str, price: f64, discount: f64, quantity: i64) -> Product {
        let now = now_millis();
        self.products()
            .create(ProductRecord {
                title: title.into(),
                description: "Soft cotton".into(),
                images: vec![],
                price,
                cost_price: price / 2.0,
                discount_percentage: discount,
                category: self.category_id.clone(),
                available_sizes: vec!["S".into(), "M".into(), "L".into()],
                colors: vec!["blue".into()],
                is_active: true,
                is_bundle: false,
                quantity,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed product")
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.state.db.clone())
    }

    pub async fn stock(&self, product_id: &str) -> i64 {
        self.products()
            .find_by_id(product_id)
            .await
            .expect("read product")
            .expect("product exists")
            .quantity
    }
}

/// Order request with a delivery price of 20
pub fn order_input(items: &[(&str, i64, &str)]) -> OrderCreate {
    OrderCreate {
        customer_info: Some(CustomerInfo {
            full_name: "Amina Benali".into(),
            phone: "0555123456".into(),
            city: "Oran".into(),
            ..Default::default()
        }),
        items: Some(
            items
                .iter()
                .map(|(product, quantity, size)| OrderItemInput {
                    product: product.to_string(),
                    quantity: *quantity,
                    size: size.to_string(),
                    color: None,
                })
                .collect(),
        ),
        delivery_price: Some(20.0),
        ..Default::default()
    }
}
