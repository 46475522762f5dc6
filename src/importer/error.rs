// ==========================================
// 细纱质量分析系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出文件解析错误
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("文件格式不支持: {0}（仅支持 .xlsx/.csv）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件无表头")]
    MissingHeader,
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Blob 存储访问错误
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob 不存在: {0}")]
    NotFound(String),

    #[error("Blob 读取失败 ({name}): {message}")]
    Io { name: String, message: String },

    #[error("Blob 下载失败 ({name}): {message}")]
    Http { name: String, message: String },
}

/// 单个单元加载失败（下载或解析）
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("单元 {unit} 下载失败: {source}")]
    Download {
        unit: String,
        #[source]
        source: BlobError,
    },

    #[error("单元 {unit} 解析失败: {source}")]
    Parse {
        unit: String,
        #[source]
        source: ImportError,
    },

    #[error("单元 {unit} 加载超时 ({timeout_secs}s)")]
    Timeout { unit: String, timeout_secs: u64 },
}

impl LoadError {
    pub fn unit(&self) -> &str {
        match self {
            LoadError::Download { unit, .. }
            | LoadError::Parse { unit, .. }
            | LoadError::Timeout { unit, .. } => unit,
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
