// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 内存 Blob 数据源、单元 CSV 构建、应用状态装配
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use spinning_quality_cache::app::AppState;
use spinning_quality_cache::cache::RefresherOptions;
use spinning_quality_cache::engine::AggregationEngine;
use spinning_quality_cache::logging;
use spinning_quality_cache::importer::{BlobError, BlobStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// MockBlobStore - 内存数据源
// ==========================================

/// 内存 Blob 数据源，可按单元模拟故障与下载延迟
#[derive(Default)]
pub struct MockBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    downloads: AtomicUsize,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次下载前等待指定时长
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// 写入单元 CSV（blob 名: {unit}.csv）
    pub fn put_unit(&self, unit: &str, csv: String) {
        self.blobs
            .lock()
            .unwrap()
            .insert(blob_name(unit), csv.into_bytes());
    }

    /// 按完整 blob 名写入原始字节（如 xlsx 文件）
    pub fn put_blob(&self, name: &str, bytes: Vec<u8>) {
        self.blobs.lock().unwrap().insert(name.to_string(), bytes);
    }

    /// 模拟单元下载故障
    pub fn fail_unit(&self, unit: &str) {
        self.failing.lock().unwrap().insert(blob_name(unit));
    }

    pub fn recover_unit(&self, unit: &str) {
        self.failing.lock().unwrap().remove(&blob_name(unit));
    }

    pub fn fail_all(&self) {
        for unit in spinning_quality_cache::UNIT_IDS {
            self.fail_unit(unit);
        }
    }

    /// 已发起的下载次数
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(name) {
            return Err(BlobError::Io {
                name: name.to_string(),
                message: "simulated outage".to_string(),
            });
        }

        self.blobs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(name.to_string()))
    }
}

fn blob_name(unit: &str) -> String {
    format!("{}.csv", unit)
}

// ==========================================
// ShiftRecord - 单元导出行构建器
// ==========================================

/// 单个班次记录（一行导出数据）
#[derive(Debug, Clone)]
pub struct ShiftRecord {
    fields: Vec<(String, String)>,
}

impl ShiftRecord {
    pub fn new(date: &str, shift: u32, machine: &str, yarn_length: f64) -> Self {
        Self {
            fields: vec![
                ("Date".to_string(), date.to_string()),
                ("ShiftNumber".to_string(), shift.to_string()),
                ("MachineName".to_string(), machine.to_string()),
                ("YarnLength".to_string(), yarn_length.to_string()),
            ],
        }
    }

    pub fn article(self, number: &str, name: &str) -> Self {
        self.text("ArticleNumber", number).text("ArticleName", name)
    }

    pub fn lot(self, lot: &str) -> Self {
        self.text("LotID", lot)
    }

    pub fn text(mut self, column: &str, value: &str) -> Self {
        self.fields.push((column.to_string(), value.to_string()));
        self
    }

    pub fn set(self, column: &str, value: f64) -> Self {
        let value = value.to_string();
        self.text(column, &value)
    }
}

/// 记录转为 CSV（表头为所有列的并集，按首次出现顺序）
pub fn to_csv(records: &[ShiftRecord]) -> String {
    let mut headers: Vec<&str> = Vec::new();
    for record in records {
        for (column, _) in &record.fields {
            if !headers.contains(&column.as_str()) {
                headers.push(column);
            }
        }
    }

    let mut out = headers.join(",");
    out.push('\n');
    for record in records {
        let line: Vec<&str> = headers
            .iter()
            .map(|h| {
                record
                    .fields
                    .iter()
                    .find(|(c, _)| c == h)
                    .map(|(_, v)| v.as_str())
                    .unwrap_or("")
            })
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

// ==========================================
// 应用状态装配
// ==========================================

pub fn app_with(store: Arc<MockBlobStore>) -> AppState {
    app_with_options(store, RefresherOptions::default())
}

pub fn app_with_options(store: Arc<MockBlobStore>, options: RefresherOptions) -> AppState {
    logging::init_test();
    AppState::with_store(store, "csv", AggregationEngine::default(), options)
}

/// 按指定扩展名加载单元文件（blob 名: {unit}.{extension}）
pub fn app_with_extension(store: Arc<MockBlobStore>, extension: &str) -> AppState {
    logging::init_test();
    AppState::with_store(
        store,
        extension,
        AggregationEngine::default(),
        RefresherOptions::default(),
    )
}

/// 向全部 6 个单元写入同一份数据
pub fn seed_all_units(store: &MockBlobStore, records: &[ShiftRecord]) {
    let csv = to_csv(records);
    for unit in spinning_quality_cache::UNIT_IDS {
        store.put_unit(unit, csv.clone());
    }
}
