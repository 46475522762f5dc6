// ==========================================
// 细纱质量分析系统 - 配置层
// ==========================================
// 职责: 服务配置加载（环境变量 + 默认值）
// ==========================================

pub mod service_config;

// 重导出核心配置
pub use service_config::{default_blob_dir, env_keys, BlobSource, LogFormat, ServiceConfig};
