// ==========================================
// 细纱质量分析系统 - 核心库
// ==========================================
// 技术栈: axum + tokio + calamine
// 系统定位: 6 个细纱单元导出文件的内存缓存 + 质量指标聚合服务
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据行与聚合结果
pub mod domain;

// 导入层 - Blob 下载与文件解析
pub mod importer;

// 引擎层 - 过滤、聚合、趋势
pub mod engine;

// 缓存层 - 快照与刷新
pub mod cache;

// 配置层 - 服务配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Aggregate, AggregateLevel, CellValue, GroupKind, LabelDimension, Row, ShiftFilter,
    ShiftValue, UnitSummary, UNIT_IDS,
};

// 引擎
pub use engine::{AggregationEngine, FilterRequest, TrendEngine, TrendRequest, TrendSeries};

// 缓存
pub use cache::{CacheRefresher, CacheSnapshot, CacheState, RefreshOutcome, RefreshTrigger};

// API
pub use api::{ApiError, ApiResult, QualityApi};

// 应用
pub use app::AppState;

// 配置
pub use config::ServiceConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "细纱质量分析系统";
