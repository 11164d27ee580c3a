//! Store Server - 服装店后台管理服务
//!
//! # 架构概述
//!
//! 本模块是 Store Server 的主入口，提供以下核心功能：
//!
//! - **订单工作流** (`orders`): 下单扣减库存、订单号分配、取消回补库存
//! - **商品目录** (`catalog`): 商品 CRUD + 图片托管
//! - **统计** (`stats`): 营收 / 成本 / 利润 / 热销商品
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单工作流 (库存扣减/回补)
//! ├── catalog/       # 商品服务
//! ├── stats/         # 统计报表
//! ├── images/        # 图片托管 (Cloudinary / 内存)
//! ├── utils/         # 错误、日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod images;
pub mod orders;
pub mod stats;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState, build_router};
pub use orders::{OrderError, OrderService};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在则忽略)
/// 2. 初始化日志 (`LOG_LEVEL`, `LOG_DIR`)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                
  / ___// /_____  ________ 
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/ 
    "#
    );
}
