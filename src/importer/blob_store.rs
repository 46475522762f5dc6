// ==========================================
// 细纱质量分析系统 - Blob 存储
// ==========================================
// 职责: 按名称下载单元导出文件的原始字节
// 实现: 本地目录 / HTTP(S) 容器地址
// ==========================================

use crate::importer::error::BlobError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Blob 存储接口（外部协作方）
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 下载指定名称的 Blob
    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError>;
}

// ==========================================
// FsBlobStore - 本地目录
// ==========================================
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(BlobError::Io {
                name: name.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// ==========================================
// HttpBlobStore - HTTP(S) 容器
// ==========================================
// URL 形如 {base_url}/{name}?{token}，token 通常为 SAS 查询串
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token
                .map(|t| t.trim_start_matches('?').to_string())
                .filter(|t| !t.is_empty()),
        }
    }

    fn url_for(&self, name: &str) -> String {
        match &self.token {
            Some(token) => format!("{}/{}?{}", self.base_url, name, token),
            None => format!("{}/{}", self.base_url, name),
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError> {
        let http_err = |message: String| BlobError::Http {
            name: name.to_string(),
            message,
        };

        let response = self
            .client
            .get(self.url_for(name))
            .send()
            .await
            .map_err(|e| http_err(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(http_err(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| http_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
