// ==========================================
// 细纱质量分析系统 - 聚合结果
// ==========================================
// 职责: 单元 → 品种 → 机台 的递归聚合结构
// 说明: 三级使用同一结构与同一套公式，只是作用的行子集不同
// ==========================================

use crate::domain::types::ShiftValue;
use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// 聚合层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateLevel {
    Unit,
    Article,
    Machine,
}

impl AggregateLevel {
    /// 下一层级；机台为叶子
    pub fn child(self) -> Option<AggregateLevel> {
        match self {
            AggregateLevel::Unit => Some(AggregateLevel::Article),
            AggregateLevel::Article => Some(AggregateLevel::Machine),
            AggregateLevel::Machine => None,
        }
    }
}

/// 按规范列顺序输出的列值表（序列化为 JSON 对象）
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValues<T>(pub Vec<(&'static str, T)>);

impl<T> ColumnValues<T> {
    pub fn get(&self, column: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| *k == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

impl<T: Serialize> Serialize for ColumnValues<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 单元级附加指标与生效的过滤条件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    /// 纱疵率（每百公里），无数据时为 "N/A"
    pub yarn_faults: String,
    pub total_cuts: i64,
    pub cuts_per_100km: String,
    pub alarms_per_1000km: String,
    pub date: Option<NaiveDate>,
    pub shift: Option<ShiftValue>,
    pub latest_shift: Option<ShiftValue>,
}

/// 聚合结果（单元 / 品种 / 机台）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub level: AggregateLevel,
    pub label: String,
    pub row_count: usize,
    pub total_yarn_length: f64,
    /// 切断原始计数
    pub cut_counts: ColumnValues<i64>,
    /// 切断率（每百公里）
    pub cuts: ColumnValues<String>,
    pub quality: ColumnValues<String>,
    pub total_alarms: i64,
    pub alarms: ColumnValues<i64>,
    #[serde(flatten)]
    pub summary: Option<UnitSummary>,
    /// 子级聚合（机台层为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Aggregate>>,
}

impl Aggregate {
    pub fn children(&self) -> &[Aggregate] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn child(&self, label: &str) -> Option<&Aggregate> {
        self.children().iter().find(|c| c.label == label)
    }
}
