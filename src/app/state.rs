// ==========================================
// 细纱质量分析系统 - 应用状态
// ==========================================
// 职责: 按配置装配数据源、缓存、刷新器与 API 实例
// ==========================================

use std::sync::Arc;

use crate::api::QualityApi;
use crate::cache::{CacheRefresher, CacheState, RefresherOptions};
use crate::config::{BlobSource, ServiceConfig};
use crate::engine::AggregationEngine;
use crate::importer::{BlobStore, DatasetLoader, FsBlobStore, HttpBlobStore};

/// 应用状态
///
/// 各 HTTP 处理器共享同一份实例
#[derive(Clone)]
pub struct AppState {
    /// 缓存刷新器（定时任务与按需刷新共用）
    pub refresher: Arc<CacheRefresher>,

    /// 质量指标API
    pub quality_api: Arc<QualityApi>,
}

impl AppState {
    /// 按服务配置创建应用状态
    pub fn new(config: &ServiceConfig) -> Self {
        let store: Arc<dyn BlobStore> = match &config.blob_source {
            BlobSource::Directory(root) => {
                tracing::info!(root = %root.display(), "使用本地目录数据源");
                Arc::new(FsBlobStore::new(root.clone()))
            }
            BlobSource::Http { base_url, token } => {
                tracing::info!(base_url = %base_url, "使用 HTTP 数据源");
                Arc::new(HttpBlobStore::new(base_url.clone(), token.clone()))
            }
        };

        let engine = AggregationEngine::new(config.min_yarn_length);
        Self::with_store(
            store,
            &config.blob_extension,
            engine,
            config.refresher_options(),
        )
    }

    /// 使用给定数据源创建应用状态
    pub fn with_store(
        store: Arc<dyn BlobStore>,
        extension: &str,
        engine: AggregationEngine,
        options: RefresherOptions,
    ) -> Self {
        let loader = Arc::new(DatasetLoader::new(store, extension));
        let cache = Arc::new(CacheState::new());

        let refresher = Arc::new(CacheRefresher::new(
            loader.clone(),
            cache,
            engine.clone(),
            options,
        ));

        let quality_api = Arc::new(QualityApi::new(refresher.clone(), loader, engine));

        Self {
            refresher,
            quality_api,
        }
    }
}
