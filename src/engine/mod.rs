// ==========================================
// 细纱质量分析系统 - 引擎层
// ==========================================
// 职责: 过滤条件推导、三级指标聚合、趋势计算
// 说明: 纯计算，只读缓存快照，不做任何 IO
// ==========================================

pub mod accumulator;
pub mod aggregation;
pub mod filter_resolver;
pub mod live;
pub mod trend;

// 重导出核心类型
pub use accumulator::{format_ratio, MetricAccumulator};
pub use aggregation::{AggregationEngine, DEFAULT_MIN_YARN_LENGTH, NOT_AVAILABLE};
pub use filter_resolver::{resolve_filters, row_matches, FilterRequest, ResolvedFilters};
pub use live::live_view;
pub use trend::{DrillDown, DrillDownPoint, TrendEngine, TrendRequest, TrendRow, TrendSeries};
