// ==========================================
// 细纱质量分析系统 - 过滤条件解析
// ==========================================
// 职责: 计算生效的 日期 / 班次 / 机台 过滤条件
// 规则:
// 1. 未指定日期: 取最新日期；驾驶舱模式取次新日期（仅一个日期时取最新）
// 2. 班次 "all": 不做班次过滤
// 3. 未指定班次: 取目标日期内数值最大的班次，同时作为 latest_shift_for_date 输出
// 4. 机台: 精确字符串匹配，与上述默认值推导无关
// ==========================================

use crate::domain::row::Row;
use crate::domain::types::{ShiftFilter, ShiftValue};
use crate::importer::column_resolver::ColumnResolver;
use chrono::NaiveDate;
use serde::Serialize;

/// 过滤请求（来自查询参数）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub date: Option<NaiveDate>,
    pub shift: Option<ShiftFilter>,
    pub unit: Option<String>,
    pub machine: Option<String>,
    /// 驾驶舱模式（默认日期为"昨天"）
    pub dashboard: bool,
}

impl FilterRequest {
    /// 是否为默认视图请求（可直接命中缓存的预计算结果）
    pub fn is_default_view(&self) -> bool {
        self == &FilterRequest::default()
    }
}

/// 生效的过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFilters {
    pub target_date: Option<NaiveDate>,
    pub target_shift: Option<ShiftValue>,
    pub latest_shift_for_date: Option<ShiftValue>,
}

/// 去重后的行日期，按时间倒序
pub fn distinct_dates_desc<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.into_iter().filter_map(ColumnResolver::date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

/// 默认日期: 最新；驾驶舱模式取次新，不足两个日期时回退最新
pub fn default_date(dates_desc: &[NaiveDate], dashboard: bool) -> Option<NaiveDate> {
    if dashboard && dates_desc.len() > 1 {
        Some(dates_desc[1])
    } else {
        dates_desc.first().copied()
    }
}

/// 目标日期内最大的班次（数值优先比较）
pub fn latest_shift<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    date: Option<NaiveDate>,
) -> Option<ShiftValue> {
    rows.into_iter()
        .filter(|row| date.is_none() || ColumnResolver::date(row) == date)
        .filter_map(ColumnResolver::shift)
        .max()
}

/// 解析生效过滤条件
///
/// # 参数
/// - rows: 用于推导默认值的行（指定单元时只含该单元，否则为全部单元合并）
/// - request: 过滤请求
pub fn resolve_filters<'a, I>(rows: I, request: &FilterRequest) -> ResolvedFilters
where
    I: IntoIterator<Item = &'a Row>,
    I::IntoIter: Clone,
{
    let rows = rows.into_iter();

    let target_date = match request.date {
        Some(date) => Some(date),
        None => default_date(&distinct_dates_desc(rows.clone()), request.dashboard),
    };

    let latest_shift_for_date = latest_shift(rows, target_date);

    let target_shift = match &request.shift {
        Some(ShiftFilter::All) => None,
        Some(ShiftFilter::Value(shift)) => Some(shift.clone()),
        None => latest_shift_for_date.clone(),
    };

    tracing::debug!(
        ?target_date,
        ?target_shift,
        ?latest_shift_for_date,
        dashboard = request.dashboard,
        "过滤条件解析完成"
    );

    ResolvedFilters {
        target_date,
        target_shift,
        latest_shift_for_date,
    }
}

/// 行是否满足生效的日期 / 班次 / 机台条件
pub fn row_matches(row: &Row, filters: &ResolvedFilters, machine: Option<&str>) -> bool {
    if let Some(date) = filters.target_date {
        if ColumnResolver::date(row) != Some(date) {
            return false;
        }
    }
    if let Some(shift) = &filters.target_shift {
        if ColumnResolver::shift(row).as_ref() != Some(shift) {
            return false;
        }
    }
    if let Some(machine) = machine {
        if ColumnResolver::machine_name(row).as_deref() != Some(machine) {
            return false;
        }
    }
    true
}
