// ==========================================
// 细纱质量分析系统 - 缓存状态
// ==========================================
// 职责: 持有当前的全量数据快照（单元 → 数据行）
// 并发: 单写多读；写入方整体替换 Arc，读取方只拿到旧快照或新快照，
//       不会看到新旧单元数据混合
// ==========================================

use crate::domain::aggregate::Aggregate;
use crate::domain::row::Row;
use crate::domain::types::UNIT_IDS;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// 单个单元的数据快照
#[derive(Debug, Clone)]
pub struct UnitSnapshot {
    pub rows: Arc<Vec<Row>>,
    pub fetched_at: DateTime<Utc>,
}

impl UnitSnapshot {
    pub fn new(rows: Vec<Row>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            rows: Arc::new(rows),
            fetched_at,
        }
    }
}

/// 全量缓存快照（不可变，整体替换）
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub units: BTreeMap<String, UnitSnapshot>,
    pub last_fetch_time: Option<DateTime<Utc>>,
    /// 预计算的默认实时视图（无过滤、非驾驶舱模式）
    pub default_view: Option<Arc<Vec<Aggregate>>>,
}

impl CacheSnapshot {
    /// 是否从未成功加载过任何单元
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 单元数据行，未加载的单元为空
    pub fn unit_rows(&self, unit: &str) -> &[Row] {
        self.units
            .get(unit)
            .map(|s| s.rows.as_slice())
            .unwrap_or(&[])
    }

    /// 按固定单元顺序遍历 (单元, 数据行)
    pub fn iter_units(&self) -> impl Iterator<Item = (&str, &[Row])> + Clone + '_ {
        UNIT_IDS.iter().map(move |unit| (*unit, self.unit_rows(unit)))
    }

    /// 各单元行数
    pub fn row_counts(&self) -> BTreeMap<String, usize> {
        self.units
            .iter()
            .map(|(unit, snapshot)| (unit.clone(), snapshot.rows.len()))
            .collect()
    }
}

/// 缓存状态持有者
#[derive(Debug, Default)]
pub struct CacheState {
    current: RwLock<Arc<CacheSnapshot>>,
}

impl CacheState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前快照（只在克隆 Arc 期间持有读锁）
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 整体替换快照
    pub fn publish(&self, next: Arc<CacheSnapshot>) {
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
