// ==========================================
// 细纱质量分析系统 - 导入层
// ==========================================
// 职责: 下载单元导出文件，解析为数据行，提供容错的列解析
// 支持: Excel (.xlsx), CSV
// ==========================================

pub mod blob_store;
pub mod column_resolver;
pub mod dataset_loader;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use blob_store::{BlobStore, FsBlobStore, HttpBlobStore};
pub use column_resolver::ColumnResolver;
pub use dataset_loader::DatasetLoader;
pub use error::{BlobError, ImportError, ImportResult, LoadError};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
