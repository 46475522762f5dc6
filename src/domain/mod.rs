// ==========================================
// 细纱质量分析系统 - 领域模型层
// ==========================================
// 职责: 数据行、标准列、值类型、聚合结果
// 红线: 不含 IO，不含引擎逻辑
// ==========================================

pub mod aggregate;
pub mod columns;
pub mod row;
pub mod types;

// 重导出核心类型
pub use aggregate::{Aggregate, AggregateLevel, ColumnValues, UnitSummary};
pub use row::{CellValue, Row};
pub use types::{
    canonical_unit, GroupKind, LabelDimension, ShiftFilter, ShiftValue, UNIT_IDS,
};
