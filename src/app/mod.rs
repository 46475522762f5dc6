// ==========================================
// 细纱质量分析系统 - 应用层
// ==========================================
// 职责: 应用状态装配 + HTTP 集成
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::{router, run_server};
pub use state::AppState;
