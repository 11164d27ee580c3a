//! 商品目录 (Catalog)
//!
//! 商品的创建/修改/删除涉及图片托管 (Image Store)，统一放在
//! [`ProductService`]。分类与评价是简单 CRUD，由 handler 直接调用 repository。

mod service;

pub use service::ProductService;

use crate::db::models::{Product, ProductView};
use crate::db::repository::{CategoryRepository, RepoResult};

/// Resolve each product's category for display
///
/// Products whose category was deleted get `category: None`.
pub async fn attach_categories(
    categories: &CategoryRepository,
    products: Vec<Product>,
) -> RepoResult<Vec<ProductView>> {
    let mut ids: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    ids.sort();
    ids.dedup();

    let categories = categories.find_map(&ids).await?;
    Ok(products
        .into_iter()
        .map(|product| {
            let category = categories.get(&product.category).cloned();
            ProductView::new(product, category)
        })
        .collect())
}
