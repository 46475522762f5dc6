// ==========================================
// 细纱质量分析系统 - 聚合引擎
// ==========================================
// 职责: 由过滤后的数据行计算 单元 → 品种 → 机台 三级指标
// 公式:
// - 纱疵率 = ΣYarnFaults / ΣYarnLength × 100
// - 切断率 = Σ切断列 / ΣYarnLength × 100（三级一致）
// - 质量值: CV/H = Σ/行数；其余 = Σ/Σ参考长度（IPI/HSIPI 逐行派生）
// - 报警: 各列合计；每千公里报警 = 总报警 / ΣYarnLength × 1000
// 红线: 纱长不足阈值的行不参与任何聚合
// ==========================================

use crate::domain::aggregate::{Aggregate, AggregateLevel, ColumnValues, UnitSummary};
use crate::domain::columns::{ALARM_COLUMNS, CUT_COLUMNS, QUALITY_COLUMNS, UNKNOWN_LABEL};
use crate::domain::row::Row;
use crate::engine::accumulator::{format_ratio, ratio, MetricAccumulator};
use crate::engine::filter_resolver::ResolvedFilters;
use crate::importer::column_resolver::ColumnResolver;
use std::collections::BTreeMap;

/// 最小有效纱长（低于此值的行视为无效样本）
pub const DEFAULT_MIN_YARN_LENGTH: f64 = 300.0;

/// 无数据时的纱疵率
pub const NOT_AVAILABLE: &str = "N/A";

// ==========================================
// ScopeTotals - 单一作用域的逐行累加
// ==========================================
#[derive(Debug, Clone, Default)]
struct ScopeTotals {
    rows: usize,
    yarn_length: f64,
    yarn_faults: f64,
    total_cuts: f64,
    cuts: [MetricAccumulator; CUT_COLUMNS.len()],
    quality: [MetricAccumulator; QUALITY_COLUMNS.len()],
    alarms: [f64; ALARM_COLUMNS.len()],
}

impl ScopeTotals {
    fn from_rows(rows: &[&Row]) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.push(row);
        }
        totals
    }

    fn push(&mut self, row: &Row) {
        let yarn_length = ColumnResolver::yarn_length(row);
        let ref_length = ColumnResolver::reference_length(row);

        self.rows += 1;
        self.yarn_length += yarn_length;
        self.yarn_faults += ColumnResolver::yarn_faults(row);
        self.total_cuts += ColumnResolver::total_cuts(row);

        for (acc, column) in self.cuts.iter_mut().zip(CUT_COLUMNS) {
            acc.add(ColumnResolver::number(row, column), ref_length, yarn_length);
        }
        for (acc, column) in self.quality.iter_mut().zip(QUALITY_COLUMNS) {
            acc.add(ColumnResolver::quality_value(row, column), ref_length, yarn_length);
        }
        for (sum, column) in self.alarms.iter_mut().zip(ALARM_COLUMNS) {
            *sum += ColumnResolver::number(row, column);
        }
    }

    fn total_alarms(&self) -> f64 {
        self.alarms.iter().sum()
    }

    fn into_aggregate(
        self,
        level: AggregateLevel,
        label: String,
        children: Option<Vec<Aggregate>>,
    ) -> Aggregate {
        Aggregate {
            level,
            label,
            row_count: self.rows,
            total_yarn_length: self.yarn_length,
            cut_counts: ColumnValues(
                CUT_COLUMNS
                    .iter()
                    .zip(&self.cuts)
                    .map(|(c, acc)| (*c, acc.sum.round() as i64))
                    .collect(),
            ),
            cuts: ColumnValues(
                CUT_COLUMNS
                    .iter()
                    .zip(&self.cuts)
                    .map(|(c, acc)| (*c, format_ratio(acc.per_100km())))
                    .collect(),
            ),
            quality: ColumnValues(
                QUALITY_COLUMNS
                    .iter()
                    .zip(&self.quality)
                    .map(|(c, acc)| (*c, format_ratio(acc.quality_value(c))))
                    .collect(),
            ),
            total_alarms: self.total_alarms().round() as i64,
            alarms: ColumnValues(
                ALARM_COLUMNS
                    .iter()
                    .zip(&self.alarms)
                    .map(|(c, sum)| (*c, sum.round() as i64))
                    .collect(),
            ),
            summary: None,
            children,
        }
    }

    fn unit_summary(&self, filters: &ResolvedFilters) -> UnitSummary {
        UnitSummary {
            yarn_faults: format_ratio(ratio(self.yarn_faults, self.yarn_length) * 100.0),
            total_cuts: self.total_cuts.round() as i64,
            cuts_per_100km: format_ratio(ratio(self.total_cuts, self.yarn_length) * 100.0),
            alarms_per_1000km: format_ratio(
                ratio(self.total_alarms(), self.yarn_length) * 1000.0,
            ),
            date: filters.target_date,
            shift: filters.target_shift.clone(),
            latest_shift: filters.latest_shift_for_date.clone(),
        }
    }
}

// ==========================================
// AggregationEngine - 聚合引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    min_yarn_length: f64,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_YARN_LENGTH)
    }
}

impl AggregationEngine {
    pub fn new(min_yarn_length: f64) -> Self {
        Self { min_yarn_length }
    }

    pub fn min_yarn_length(&self) -> f64 {
        self.min_yarn_length
    }

    /// 行是否达到最小有效纱长
    pub fn is_valid_sample(&self, row: &Row) -> bool {
        ColumnResolver::yarn_length(row) >= self.min_yarn_length
    }

    /// 计算单元聚合
    ///
    /// # 参数
    /// - unit: 单元标识
    /// - rows: 已按 日期/班次/机台 过滤的行
    /// - filters: 生效的过滤条件（回显到结果）
    ///
    /// # 返回
    /// 空行集返回定义好的空聚合（纱疵率 "N/A"）
    pub fn aggregate<'a, I>(&self, unit: &str, rows: I, filters: &ResolvedFilters) -> Aggregate
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let rows: Vec<&Row> = rows
            .into_iter()
            .filter(|row| self.is_valid_sample(row))
            .collect();

        if rows.is_empty() {
            return Self::empty(unit, filters);
        }

        let totals = ScopeTotals::from_rows(&rows);
        let summary = totals.unit_summary(filters);
        let mut aggregate = Self::summarize(AggregateLevel::Unit, unit.to_string(), &rows, totals);
        aggregate.summary = Some(summary);
        aggregate
    }

    /// 空聚合
    pub fn empty(unit: &str, filters: &ResolvedFilters) -> Aggregate {
        let mut aggregate = ScopeTotals::default().into_aggregate(
            AggregateLevel::Unit,
            unit.to_string(),
            Some(Vec::new()),
        );
        let mut summary = ScopeTotals::default().unit_summary(filters);
        summary.yarn_faults = NOT_AVAILABLE.to_string();
        aggregate.summary = Some(summary);
        aggregate
    }

    /// 同一套累加逐级递归: 单元按品种分组，品种按机台分组
    fn summarize(
        level: AggregateLevel,
        label: String,
        rows: &[&Row],
        totals: ScopeTotals,
    ) -> Aggregate {
        let children = level.child().map(|child_level| {
            group_rows(rows, child_level)
                .into_iter()
                .map(|(child_label, child_rows)| {
                    let child_totals = ScopeTotals::from_rows(&child_rows);
                    Self::summarize(child_level, child_label, &child_rows, child_totals)
                })
                .collect()
        });

        totals.into_aggregate(level, label, children)
    }
}

/// 按子级标签分组（品种号 / 机台名，缺失归入 "Unknown"），按标签排序
fn group_rows<'a>(rows: &[&'a Row], level: AggregateLevel) -> BTreeMap<String, Vec<&'a Row>> {
    let mut groups: BTreeMap<String, Vec<&'a Row>> = BTreeMap::new();
    for row in rows {
        let label = match level {
            AggregateLevel::Article => ColumnResolver::article_number(row),
            AggregateLevel::Machine => ColumnResolver::machine_name(row),
            AggregateLevel::Unit => None,
        }
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        groups.entry(label).or_default().push(*row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::CellValue;

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    #[test]
    fn test_yarn_fault_rate_with_missing_faults() {
        let rows = vec![
            Row::new()
                .with("YarnLength", num(1000.0))
                .with("YarnFaults", num(5.0)),
            Row::new()
                .with("YarnLength", num(500.0))
                .with("YarnFaults", CellValue::Text("-".into())),
        ];

        let agg = AggregationEngine::default().aggregate("unit1", &rows, &ResolvedFilters::default());
        let summary = agg.summary.unwrap();
        assert_eq!(summary.yarn_faults, "0.33");
        assert_eq!(agg.total_yarn_length, 1500.0);
    }

    #[test]
    fn test_empty_rows_yield_empty_aggregate() {
        let agg = AggregationEngine::default().aggregate("unit2", &[], &ResolvedFilters::default());
        assert_eq!(agg.summary.as_ref().unwrap().yarn_faults, NOT_AVAILABLE);
        assert_eq!(agg.total_alarms, 0);
        assert_eq!(agg.children(), &[] as &[Aggregate]);
        assert_eq!(agg.cuts.get("NCuts"), Some(&"0.00".to_string()));
    }

    #[test]
    fn test_short_rows_excluded() {
        let rows = vec![
            Row::new()
                .with("YarnLength", num(299.9))
                .with("YarnFaults", num(100.0)),
            Row::new()
                .with("YarnLength", num(300.0))
                .with("YarnFaults", num(3.0)),
        ];

        let agg = AggregationEngine::default().aggregate("unit1", &rows, &ResolvedFilters::default());
        assert_eq!(agg.row_count, 1);
        assert_eq!(agg.summary.unwrap().yarn_faults, "1.00");
    }

    #[test]
    fn test_alarm_and_cut_totals() {
        let rows = vec![Row::new()
            .with("YarnLength", num(2000.0))
            .with("TotalCuts", num(10.0))
            .with("nsltalarms", num(2.0))
            .with("SpliceAlarms", num(3.0))
            .with("NCuts", num(4.0))];

        let agg = AggregationEngine::default().aggregate("unit1", &rows, &ResolvedFilters::default());
        assert_eq!(agg.total_alarms, 5);
        assert_eq!(agg.alarms.get("NSLTAlarms"), Some(&2));
        assert_eq!(agg.cut_counts.get("NCuts"), Some(&4));
        assert_eq!(agg.cuts.get("NCuts"), Some(&"0.20".to_string()));

        let summary = agg.summary.unwrap();
        assert_eq!(summary.total_cuts, 10);
        assert_eq!(summary.cuts_per_100km, "0.50");
        assert_eq!(summary.alarms_per_1000km, "2.50");
    }

    #[test]
    fn test_hierarchy_groups_by_article_then_machine() {
        let row = |article: Option<&str>, machine: &str| {
            let mut r = Row::new()
                .with("YarnLength", num(1000.0))
                .with("MachineName", CellValue::Text(machine.into()));
            if let Some(a) = article {
                r.insert("ArticleNumber", CellValue::Text(a.into()));
            }
            r
        };
        let rows = vec![
            row(Some("A10"), "M1"),
            row(Some("A10"), "M2"),
            row(Some("A10"), "M1"),
            row(None, "M3"),
        ];

        let agg = AggregationEngine::default().aggregate("unit1", &rows, &ResolvedFilters::default());
        let labels: Vec<&str> = agg.children().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["A10", UNKNOWN_LABEL]);

        let article = agg.child("A10").unwrap();
        assert_eq!(article.level, AggregateLevel::Article);
        assert_eq!(article.child("M1").unwrap().row_count, 2);
        assert!(article.child("M1").unwrap().children.is_none());
    }

    #[test]
    fn test_quality_formulas() {
        let rows = vec![
            Row::new()
                .with("YarnLength", num(1000.0))
                .with("IPRefLength", num(500.0))
                .with("CV", num(12.0))
                .with("Thin50", num(10.0))
                .with("Thick50", num(20.0))
                .with("Nep200", num(30.0)),
            Row::new()
                .with("YarnLength", num(1000.0))
                .with("RefLength", num(500.0))
                .with("CV", num(14.0))
                .with("Thin40", num(20.0)),
        ];

        let agg = AggregationEngine::default().aggregate("unit1", &rows, &ResolvedFilters::default());
        assert_eq!(agg.quality.get("CV"), Some(&"13.00".to_string()));
        // IPI = (10+20+30) / 1000
        assert_eq!(agg.quality.get("IPI"), Some(&"0.06".to_string()));
        assert_eq!(agg.quality.get("Thin50"), Some(&"0.01".to_string()));
        // HSIPI = 20 / 1000
        assert_eq!(agg.quality.get("HSIPI"), Some(&"0.02".to_string()));
    }
}
