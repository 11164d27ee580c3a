use thiserror::Error;

use crate::utils::AppError;

/// 启动/运行期错误 (请求级错误见 [`AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("初始化失败: {0}")]
    Init(#[from] AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 服务器启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
