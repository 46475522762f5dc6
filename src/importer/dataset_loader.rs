// ==========================================
// 细纱质量分析系统 - 单元数据加载器
// ==========================================
// 职责: 下载单个单元的导出文件并解析为数据行
// 说明: 单次尝试，不做重试；失败按单元上报，由调用方决定回退策略
// ==========================================

use crate::domain::row::Row;
use crate::importer::blob_store::BlobStore;
use crate::importer::error::LoadError;
use crate::importer::file_parser::UniversalFileParser;
use std::sync::Arc;
use std::time::Instant;

pub struct DatasetLoader {
    store: Arc<dyn BlobStore>,
    extension: String,
}

impl DatasetLoader {
    /// # 参数
    /// - store: Blob 存储
    /// - extension: 导出文件扩展名（如 `xlsx`），Blob 名称为 `{unit}.{extension}`
    pub fn new(store: Arc<dyn BlobStore>, extension: impl Into<String>) -> Self {
        Self {
            store,
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn blob_name(&self, unit: &str) -> String {
        format!("{}.{}", unit, self.extension)
    }

    /// 加载单个单元的全部数据行
    pub async fn load_unit(&self, unit: &str) -> Result<Vec<Row>, LoadError> {
        let started = Instant::now();
        let name = self.blob_name(unit);

        let bytes = self
            .store
            .download(&name)
            .await
            .map_err(|source| LoadError::Download {
                unit: unit.to_string(),
                source,
            })?;

        let rows = UniversalFileParser
            .parse(&bytes)
            .map_err(|source| LoadError::Parse {
                unit: unit.to_string(),
                source,
            })?;

        tracing::debug!(
            unit,
            blob = %name,
            bytes = bytes.len(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "单元数据加载完成"
        );

        Ok(rows)
    }
}
