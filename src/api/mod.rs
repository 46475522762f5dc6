// ==========================================
// 细纱质量分析系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 HTTP 路由调用
// ==========================================

pub mod dto;
pub mod error;
pub mod quality_api;

// 重导出核心类型
pub use dto::{AvailableFilters, FiltersQuery, HealthResponse, LiveQuery, TrendQuery};
pub use error::{ApiError, ApiResult};
pub use quality_api::QualityApi;
