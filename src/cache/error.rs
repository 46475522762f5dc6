// ==========================================
// 细纱质量分析系统 - 缓存层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// 刷新时所有单元都加载失败
    #[error("数据源不可用，所有单元加载失败: {0}")]
    UpstreamUnavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
