// ==========================================
// 细纱质量分析系统 - 实时视图
// ==========================================
// 职责: 组合 过滤条件推导 + 聚合，生成各单元的实时指标
// 说明: 默认值推导在选中单元的合并行上进行，之后每个单元独立聚合
// ==========================================

use crate::domain::aggregate::Aggregate;
use crate::domain::row::Row;
use crate::engine::aggregation::AggregationEngine;
use crate::engine::filter_resolver::{resolve_filters, row_matches, FilterRequest};

/// 计算实时视图
///
/// # 参数
/// - units: (单元标识, 数据行)，按固定单元顺序
/// - request: 过滤请求；指定单元时只计算该单元
/// - engine: 聚合引擎
pub fn live_view<'a, I>(units: I, request: &FilterRequest, engine: &AggregationEngine) -> Vec<Aggregate>
where
    I: IntoIterator<Item = (&'a str, &'a [Row])>,
{
    let selected: Vec<(&str, &[Row])> = units
        .into_iter()
        .filter(|(unit, _)| match &request.unit {
            Some(wanted) => unit.eq_ignore_ascii_case(wanted.trim()),
            None => true,
        })
        .collect();

    let filters = resolve_filters(selected.iter().flat_map(|(_, rows)| rows.iter()), request);
    let machine = request.machine.as_deref();

    selected
        .iter()
        .map(|(unit, rows)| {
            engine.aggregate(
                unit,
                rows.iter().filter(|row| row_matches(row, &filters, machine)),
                &filters,
            )
        })
        .collect()
}
