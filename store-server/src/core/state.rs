use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::catalog::ProductService;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::images::{CloudinaryImageStore, ImageStore, MemoryImageStore};
use crate::orders::OrderService;
use crate::stats::StatsService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价克隆的句柄 (`Surreal<Db>` 内部是 Arc)，
/// 每个请求拿到的是同一组服务。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | images | Arc<dyn ImageStore> | 图片托管 |
/// | orders | OrderService | 订单工作流 (库存扣减/回补) |
/// | products | ProductService | 商品 + 图片 |
/// | stats | StatsService | 统计 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    pub images: Arc<dyn ImageStore>,
    pub orders: OrderService,
    pub products: ProductService,
    pub stats: StatsService,
}

impl ServerState {
    /// 用已打开的数据库和图片存储组装状态
    ///
    /// 测试中直接传入 [`MemoryImageStore`]
    pub fn with_parts(config: Config, db: Surreal<Db>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            orders: OrderService::new(db.clone()),
            products: ProductService::new(db.clone(), images.clone(), &config.image_folder),
            stats: StatsService::new(db.clone(), config.timezone),
            config,
            db,
            images,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库 (work_dir/database) 并应用 schema
    /// 3. 选择图片存储 (Cloudinary 或内存)
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir)?;

        let db_path = db_dir
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("Invalid database path: {db_dir:?}")))?;
        let db_service =
            DbService::new(db_path, &config.database_ns, &config.database_db).await?;

        let images: Arc<dyn ImageStore> = match &config.cloudinary {
            Some(cloudinary) => {
                tracing::info!(cloud = %cloudinary.cloud_name, "Image store: Cloudinary");
                Arc::new(CloudinaryImageStore::new(cloudinary.clone()))
            }
            None => {
                tracing::warn!(
                    "Cloudinary credentials not set, images are kept in memory and lost on restart"
                );
                Arc::new(MemoryImageStore::new())
            }
        };

        Ok(Self::with_parts(config.clone(), db_service.db, images))
    }

    /// 数据库服务句柄 (健康检查等)
    pub fn db_service(&self) -> DbService {
        DbService {
            db: self.db.clone(),
        }
    }
}
