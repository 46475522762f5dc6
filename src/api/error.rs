// ==========================================
// 细纱质量分析系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把缓存 / 导入层错误转换为面向请求方的错误
// ==========================================

use crate::cache::error::CacheError;
use crate::importer::error::{BlobError, LoadError};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求参数错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("缺少必填参数: {0}")]
    MissingParameter(&'static str),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据源错误
    // ==========================================
    /// 缓存为空且按需刷新失败
    #[error("数据源不可用: {0}")]
    UpstreamUnavailable(String),

    /// 单元文件直接下载失败
    #[error("单元数据加载失败: {0}")]
    LoadFailed(String),
}

impl ApiError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) | ApiError::MissingParameter(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::LoadFailed(_) => 502,
            ApiError::UpstreamUnavailable(_) => 503,
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
        }
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        match &err {
            LoadError::Download {
                source: BlobError::NotFound(name),
                ..
            } => ApiError::NotFound(format!("单元文件不存在: {}", name)),
            _ => ApiError::LoadFailed(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
