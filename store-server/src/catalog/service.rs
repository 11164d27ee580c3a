//! Product Service
//!
//! Product CRUD with hosted images:
//! - create: data URLs are uploaded before the record is written
//! - update: hosted URLs are kept, data URLs uploaded, dropped images deleted
//! - delete: images are removed from the store first

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::attach_categories;
use crate::db::models::{
    Product, ProductCreate, ProductFilter, ProductPatch, ProductRecord, ProductUpdate, ProductView,
};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::images::{self, ImageStore};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};

#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
    categories: CategoryRepository,
    images: Arc<dyn ImageStore>,
    folder: String,
}

impl ProductService {
    /// `image_root` is the top-level folder; product images go to `<root>/products`
    pub fn new(db: Surreal<Db>, images: Arc<dyn ImageStore>, image_root: &str) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            categories: CategoryRepository::new(db),
            images,
            folder: format!("{}/products", image_root.trim_end_matches('/')),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<ProductView>> {
        let products = self.products.find_all(filter).await?;
        Ok(attach_categories(&self.categories, products).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<ProductView> {
        let product = self.find(id).await?;
        self.view(product).await
    }

    pub async fn by_category(&self, category_id: &str) -> AppResult<Vec<ProductView>> {
        let products = self.products.find_by_category(category_id).await?;
        Ok(attach_categories(&self.categories, products).await?)
    }

    /// Active products among `ids`; unknown ids are ignored
    pub async fn by_ids(&self, ids: &[String]) -> AppResult<Vec<ProductView>> {
        let products = self.products.find_by_ids(ids, true).await?;
        Ok(attach_categories(&self.categories, products).await?)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn create(&self, input: ProductCreate) -> AppResult<ProductView> {
        let title = validate_required_text(input.title.as_deref(), "title", MAX_NAME_LEN)?;
        let description =
            validate_required_text(input.description.as_deref(), "description", MAX_NOTE_LEN)?;
        let price = positive(input.price, "price")?;
        let cost_price = positive(input.cost_price, "cost_price")?;
        let discount_percentage = discount(input.discount_percentage.unwrap_or(0.0))?;
        let category = self.existing_category(input.category.as_deref()).await?;
        let available_sizes = sizes(input.available_sizes.unwrap_or_default())?;
        let quantity = stock(input.quantity.unwrap_or(0))?;

        let data_urls = input.images.unwrap_or_default();
        if data_urls.is_empty() {
            return Err(AppError::validation("At least one image is required"));
        }

        let uploaded = images::upload_many(self.images.as_ref(), &data_urls, &self.folder).await?;
        let image_urls: Vec<String> = uploaded.into_iter().map(|img| img.url).collect();

        let now = now_millis();
        let record = ProductRecord {
            title,
            description,
            images: image_urls.clone(),
            price,
            cost_price,
            discount_percentage,
            category,
            available_sizes,
            colors: clean_list(input.colors.unwrap_or_default()),
            is_active: true,
            is_bundle: input.is_bundle.unwrap_or(false),
            quantity,
            created_at: now,
            updated_at: now,
        };

        let product = match self.products.create(record).await {
            Ok(product) => product,
            Err(e) => {
                images::delete_quietly(self.images.as_ref(), &image_urls).await;
                return Err(e.into());
            }
        };

        tracing::info!(product_id = %product.id, title = %product.title, "Product created");
        self.view(product).await
    }

    pub async fn update(&self, id: &str, input: ProductUpdate) -> AppResult<ProductView> {
        let current = self.find(id).await?;

        let mut patch = ProductPatch {
            updated_at: now_millis(),
            ..Default::default()
        };
        if input.title.is_some() {
            patch.title = Some(validate_required_text(
                input.title.as_deref(),
                "title",
                MAX_NAME_LEN,
            )?);
        }
        if input.description.is_some() {
            patch.description = Some(validate_required_text(
                input.description.as_deref(),
                "description",
                MAX_NOTE_LEN,
            )?);
        }
        if input.price.is_some() {
            patch.price = Some(positive(input.price, "price")?);
        }
        if input.cost_price.is_some() {
            patch.cost_price = Some(positive(input.cost_price, "cost_price")?);
        }
        if let Some(value) = input.discount_percentage {
            patch.discount_percentage = Some(discount(value)?);
        }
        if input.category.is_some() {
            patch.category = Some(self.existing_category(input.category.as_deref()).await?);
        }
        if let Some(values) = input.available_sizes {
            patch.available_sizes = Some(sizes(values)?);
        }
        if let Some(values) = input.colors {
            patch.colors = Some(clean_list(values));
        }
        if let Some(quantity) = input.quantity {
            patch.quantity = Some(stock(quantity)?);
        }
        patch.is_active = input.is_active;
        patch.is_bundle = input.is_bundle;

        let mut dropped: Vec<String> = Vec::new();
        let mut fresh: Vec<String> = Vec::new();
        if let Some(requested) = input.images {
            let (kept, to_upload) = partition_images(self.images.as_ref(), requested);
            fresh = images::upload_many(self.images.as_ref(), &to_upload, &self.folder)
                .await?
                .into_iter()
                .map(|img| img.url)
                .collect();

            let mut next = kept;
            next.extend(fresh.iter().cloned());
            dropped = current
                .images
                .iter()
                .filter(|url| self.images.is_hosted_url(url) && !next.contains(url))
                .cloned()
                .collect();
            patch.images = Some(next);
        }

        let product = match self.products.update(id, patch).await {
            Ok(product) => product,
            Err(e) => {
                images::delete_quietly(self.images.as_ref(), &fresh).await;
                return Err(e.into());
            }
        };
        if !dropped.is_empty() {
            images::delete_quietly(self.images.as_ref(), &dropped).await;
        }

        tracing::info!(product_id = %id, "Product updated");
        self.view(product).await
    }

    /// Hard delete; hosted images are removed first
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let product = self.find(id).await?;

        let hosted: Vec<String> = product
            .images
            .iter()
            .filter(|url| self.images.is_hosted_url(url))
            .cloned()
            .collect();
        images::delete_quietly(self.images.as_ref(), &hosted).await;

        if !self.products.delete(id).await? {
            return Err(product_not_found(id));
        }
        tracing::info!(product_id = %id, title = %product.title, "Product deleted");
        Ok(())
    }

    pub async fn set_quantity(&self, id: &str, quantity: Option<i64>) -> AppResult<ProductView> {
        let quantity = quantity.ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidQuantity, "quantity is required")
        })?;
        let quantity = stock(quantity)?;

        self.find(id).await?;
        let product = self.products.set_quantity(id, quantity, now_millis()).await?;
        tracing::info!(product_id = %id, quantity, "Product stock set");
        self.view(product).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn find(&self, id: &str) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    async fn view(&self, product: Product) -> AppResult<ProductView> {
        let category = self.categories.find_by_id(&product.category).await?;
        Ok(ProductView::new(product, category))
    }

    async fn existing_category(&self, id: Option<&str>) -> AppResult<String> {
        let id = validate_required_text(id, "category", MAX_NAME_LEN)?;
        if self.categories.find_by_id(&id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::CategoryNotFound,
                "Category not found",
            )
            .with_detail("category_id", id));
        }
        Ok(id)
    }
}

fn product_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, "Product not found")
        .with_detail("product_id", id)
}

fn positive(value: Option<f64>, field: &str) -> AppResult<f64> {
    match value {
        None => Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                .with_detail("field", field),
        ),
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        Some(_) => Err(AppError::validation(format!(
            "{field} must be greater than 0"
        ))),
    }
}

fn discount(value: f64) -> AppResult<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "discount_percentage must be between 0 and 100",
        ))
    }
}

fn stock(quantity: i64) -> AppResult<i64> {
    if quantity < 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            "quantity must not be negative",
        ));
    }
    Ok(quantity)
}

fn sizes(values: Vec<String>) -> AppResult<Vec<String>> {
    let sizes = clean_list(values);
    if sizes.is_empty() {
        return Err(AppError::validation("At least one size is required"));
    }
    if let Some(long) = sizes.iter().find(|s| s.chars().count() > MAX_SHORT_TEXT_LEN) {
        return Err(AppError::validation(format!("size is too long: {long}")));
    }
    Ok(sizes)
}

/// Trim, drop blanks and duplicates (order kept)
fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Split a requested image list into already-hosted URLs and data URLs to upload
///
/// Anything else is dropped.
fn partition_images(store: &dyn ImageStore, requested: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::new();
    let mut to_upload = Vec::new();
    for image in requested {
        if store.is_hosted_url(&image) {
            kept.push(image);
        } else if images::is_data_url(&image) {
            to_upload.push(image);
        }
    }
    (kept, to_upload)
}
