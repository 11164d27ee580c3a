use std::path::PathBuf;

use chrono_tz::Tz;

use crate::images::CloudinaryConfig;
use crate::utils::time::parse_timezone;

/// 服务器配置 - 后台服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | DATABASE_NS | store | SurrealDB namespace |
/// | DATABASE_DB | store | SurrealDB database |
/// | STORE_TIMEZONE | UTC | 店铺时区 (统计/日期过滤) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭等待(毫秒) |
/// | BODY_LIMIT_MB | 50 | 请求体上限 (base64 图片) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (设置后按天滚动写文件) |
/// | IMAGE_FOLDER | pajama-store | 图片托管根目录 |
/// | CLOUDINARY_CLOUD_NAME / _API_KEY / _API_SECRET | - | 图片托管凭据 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/store HTTP_PORT=8080 STORE_TIMEZONE=Africa/Algiers cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    pub database_ns: String,
    pub database_db: String,
    /// 店铺时区
    pub timezone: Tz,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// 请求体上限 (MB)
    pub body_limit_mb: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 图片托管根目录 (商品图片在 `<root>/products`)
    pub image_folder: String,
    /// 未配置时使用内存图片存储
    pub cloudinary: Option<CloudinaryConfig>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let timezone_name = env_or("STORE_TIMEZONE", "UTC");
        let timezone = parse_timezone(&timezone_name).unwrap_or_else(|| {
            tracing::warn!(timezone = %timezone_name, "Unknown STORE_TIMEZONE, using UTC");
            Tz::UTC
        });

        Self {
            work_dir: env_or("WORK_DIR", "./data"),
            http_port: env_parse("HTTP_PORT", 5000),
            database_ns: env_or("DATABASE_NS", "store"),
            database_db: env_or("DATABASE_DB", "store"),
            timezone,
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
            body_limit_mb: env_parse("BODY_LIMIT_MB", 50),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.trim().is_empty()),
            image_folder: env_or("IMAGE_FOLDER", "pajama-store"),
            cloudinary: CloudinaryConfig::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录 (RocksDB)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 请求体上限 (字节)
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
