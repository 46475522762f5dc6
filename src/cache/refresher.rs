// ==========================================
// 细纱质量分析系统 - 缓存刷新器
// ==========================================
// 职责: 并发加载全部单元，整体替换缓存快照
// 规则:
// 1. 同一时刻只允许一次刷新；刷新进行中再次触发时直接跳过
// 2. 单元加载失败: 记录日志并保留该单元的旧快照，其它单元照常更新
// 3. 全部单元完成（成功或回退）后，先计算默认实时视图，再一次性发布
// 4. 所有单元都失败且没有可沿用的旧快照: 不发布，返回 UpstreamUnavailable
// ==========================================

use crate::cache::error::{CacheError, CacheResult};
use crate::cache::state::{CacheSnapshot, CacheState, UnitSnapshot};
use crate::domain::types::UNIT_IDS;
use crate::engine::aggregation::AggregationEngine;
use crate::engine::filter_resolver::FilterRequest;
use crate::engine::live::live_view;
use crate::importer::dataset_loader::DatasetLoader;
use crate::importer::error::LoadError;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// 刷新触发类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshTrigger {
    /// 定时刷新
    Scheduled,
    /// 读请求发现缓存为空
    OnDemand,
    /// 人工触发
    Manual,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &str {
        match self {
            RefreshTrigger::Scheduled => "SCHEDULED",
            RefreshTrigger::OnDemand => "ON_DEMAND",
            RefreshTrigger::Manual => "MANUAL",
        }
    }
}

/// 单元刷新结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitRefreshStatus {
    /// 加载成功
    Loaded { rows: usize },
    /// 加载失败，沿用旧快照
    Retained {
        rows: usize,
        fetched_at: DateTime<Utc>,
        error: String,
    },
    /// 加载失败且无旧快照
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRefreshReport {
    pub unit: String,
    #[serde(flatten)]
    pub status: UnitRefreshStatus,
}

/// 刷新报告
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub refresh_id: String,
    pub trigger: RefreshTrigger,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub units: Vec<UnitRefreshReport>,
}

impl RefreshReport {
    pub fn loaded_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitRefreshStatus::Loaded { .. }))
            .count()
    }
}

/// refresh() 的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshOutcome {
    Completed(RefreshReport),
    /// 已有刷新在执行，本次被合并
    Skipped,
}

/// 刷新器参数
#[derive(Debug, Clone)]
pub struct RefresherOptions {
    /// 单元加载超时
    pub unit_timeout: Duration,
    /// 旧快照最长沿用时间，超过后告警（None 表示不检查）
    pub max_staleness: Option<chrono::Duration>,
}

impl Default for RefresherOptions {
    fn default() -> Self {
        Self {
            unit_timeout: Duration::from_secs(120),
            max_staleness: Some(chrono::Duration::hours(4)),
        }
    }
}

// ==========================================
// CacheRefresher - 缓存刷新器
// ==========================================
pub struct CacheRefresher {
    loader: Arc<DatasetLoader>,
    state: Arc<CacheState>,
    engine: AggregationEngine,
    options: RefresherOptions,
    in_flight: Mutex<()>,
}

impl CacheRefresher {
    pub fn new(
        loader: Arc<DatasetLoader>,
        state: Arc<CacheState>,
        engine: AggregationEngine,
        options: RefresherOptions,
    ) -> Self {
        Self {
            loader,
            state,
            engine,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &Arc<CacheState> {
        &self.state
    }

    /// 刷新缓存；已有刷新在执行时跳过
    pub async fn refresh(&self, trigger: RefreshTrigger) -> CacheResult<RefreshOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::info!(trigger = trigger.as_str(), "已有刷新在执行，本次跳过");
            return Ok(RefreshOutcome::Skipped);
        };

        self.run_refresh(trigger).await.map(RefreshOutcome::Completed)
    }

    /// 确保缓存已加载
    ///
    /// 缓存为空时触发一次按需刷新；若已有刷新在执行则等待其完成，不重复下载
    pub async fn ensure_loaded(&self) -> CacheResult<Arc<CacheSnapshot>> {
        let snapshot = self.state.snapshot();
        if !snapshot.is_empty() {
            return Ok(snapshot);
        }

        let _guard = self.in_flight.lock().await;

        // 等锁期间可能已被其它刷新填充
        let snapshot = self.state.snapshot();
        if !snapshot.is_empty() {
            return Ok(snapshot);
        }

        self.run_refresh(RefreshTrigger::OnDemand).await?;
        Ok(self.state.snapshot())
    }

    /// 执行一次刷新（调用方需持有 in_flight）
    async fn run_refresh(&self, trigger: RefreshTrigger) -> CacheResult<RefreshReport> {
        let refresh_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let started = Instant::now();

        tracing::info!(
            refresh_id = %refresh_id,
            trigger = trigger.as_str(),
            "开始刷新单元数据"
        );

        let previous = self.state.snapshot();

        // 并发加载全部单元
        let loads = UNIT_IDS.iter().map(|unit| async move {
            let result =
                match tokio::time::timeout(self.options.unit_timeout, self.loader.load_unit(unit))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(LoadError::Timeout {
                        unit: unit.to_string(),
                        timeout_secs: self.options.unit_timeout.as_secs(),
                    }),
                };
            (*unit, result)
        });
        let results = join_all(loads).await;

        let fetched_at = Utc::now();
        let mut units = BTreeMap::new();
        let mut reports = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (unit, result) in results {
            let status = match result {
                Ok(rows) => {
                    let count = rows.len();
                    units.insert(unit.to_string(), UnitSnapshot::new(rows, fetched_at));
                    UnitRefreshStatus::Loaded { rows: count }
                }
                Err(err) => {
                    tracing::warn!(refresh_id = %refresh_id, unit, error = %err, "单元加载失败");
                    failures.push(err.to_string());
                    self.retain_previous(&previous, unit, err, fetched_at, &mut units)
                }
            };
            reports.push(UnitRefreshReport {
                unit: unit.to_string(),
                status,
            });
        }

        if units.is_empty() {
            tracing::error!(
                refresh_id = %refresh_id,
                "所有单元加载失败且无旧快照可沿用"
            );
            return Err(CacheError::UpstreamUnavailable(failures.join("; ")));
        }
        if failures.len() == UNIT_IDS.len() {
            tracing::error!(refresh_id = %refresh_id, "所有单元加载失败，沿用旧快照发布");
        }

        let mut next = CacheSnapshot {
            units,
            last_fetch_time: Some(fetched_at),
            default_view: None,
        };
        let default_view = live_view(next.iter_units(), &FilterRequest::default(), &self.engine);
        next.default_view = Some(Arc::new(default_view));

        self.state.publish(Arc::new(next));

        let report = RefreshReport {
            refresh_id,
            trigger,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            units: reports,
        };

        tracing::info!(
            refresh_id = %report.refresh_id,
            loaded = report.loaded_count(),
            failed = failures.len(),
            duration_ms = report.duration_ms,
            "单元数据刷新完成"
        );

        Ok(report)
    }

    /// 加载失败时沿用旧快照，并检查是否超过最长沿用时间
    fn retain_previous(
        &self,
        previous: &CacheSnapshot,
        unit: &str,
        err: LoadError,
        now: DateTime<Utc>,
        units: &mut BTreeMap<String, UnitSnapshot>,
    ) -> UnitRefreshStatus {
        let Some(old) = previous.units.get(unit) else {
            return UnitRefreshStatus::Failed {
                error: err.to_string(),
            };
        };

        if let Some(limit) = self.options.max_staleness {
            let age = now - old.fetched_at;
            if age > limit {
                tracing::warn!(
                    unit,
                    age_minutes = age.num_minutes(),
                    limit_minutes = limit.num_minutes(),
                    "单元数据已超过最长沿用时间"
                );
            }
        }

        units.insert(unit.to_string(), old.clone());
        UnitRefreshStatus::Retained {
            rows: old.rows.len(),
            fetched_at: old.fetched_at,
            error: err.to_string(),
        }
    }
}
