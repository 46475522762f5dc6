// ==========================================
// 细纱质量分析系统 - API 请求 / 响应结构
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GET live 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveQuery {
    pub date: Option<String>,
    pub shift: Option<String>,
    pub unit: Option<String>,
    pub machine: Option<String>,
    pub mode: Option<String>,
}

/// GET available-filters 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltersQuery {
    pub unit: Option<String>,
}

/// GET trend 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    pub group: Option<String>,
    pub first_column: Option<String>,
    pub parameter: Option<String>,
    pub unit: Option<String>,
    /// 逗号分隔的标签值
    pub filter_values: Option<String>,
}

/// 可选过滤值（去重、升序）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFilters {
    pub dates: Vec<String>,
    pub shifts: Vec<String>,
    pub units: Vec<String>,
    pub machines: Vec<String>,
    pub articles: Vec<String>,
    pub article_names: Vec<String>,
    pub lot_ids: Vec<String>,
}

/// 健康检查
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" 已加载；"empty" 尚未加载任何单元
    pub status: &'static str,
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub units: BTreeMap<String, usize>,
}

/// 非空白的查询参数
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
