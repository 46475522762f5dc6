// ==========================================
// 细纱质量分析系统 - 趋势引擎
// ==========================================
// 职责: 计算 日期 × 标签 的时间序列，并按机台下钻
// 分桶: (日期, 标签) 与 (日期, 标签, 机台) 两级 MetricAccumulator
// 取值: quality → CV/H 均值，其余 Σ/参考长度
//       cuts / cmt → Σ/纱长 × 100
//       alarms 及其它 → 原始合计
// 说明: 趋势不做最小纱长过滤；无法解析日期的行跳过
//       标签 / 机台名与输出字段 date、machines 同名时追加 "_"
// ==========================================

use crate::domain::columns::{HSIPI, IPI, TOTAL_ALARMS, UNKNOWN_LABEL};
use crate::domain::row::{CellValue, Row};
use crate::domain::types::{GroupKind, LabelDimension};
use crate::engine::accumulator::{format_ratio, MetricAccumulator};
use crate::importer::column_resolver::ColumnResolver;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// 趋势请求
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRequest {
    pub group: GroupKind,
    pub dimension: LabelDimension,
    pub parameter: String,
    pub unit: Option<String>,
    /// 仅保留这些标签值（None 或空表示不过滤）
    pub label_values: Option<Vec<String>>,
}

/// 单日一行: 各标签取值 + 各标签的机台明细
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
    pub machines: BTreeMap<String, BTreeMap<String, String>>,
}

/// 下钻序列中的单日: 各机台取值（缺失机台不出现）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDownPoint {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
}

/// 单个标签的机台下钻
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDown {
    pub machines: Vec<String>,
    pub series: Vec<DrillDownPoint>,
}

/// 趋势结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub data: Vec<TrendRow>,
    pub labels: Vec<String>,
    pub dates: Vec<String>,
    pub drill_down_data: BTreeMap<String, DrillDown>,
}

/// 与展开后的标签 / 机台键同级的输出字段
const RESERVED_KEYS: [&str; 2] = ["date", "machines"];

type LabelBuckets = BTreeMap<String, (MetricAccumulator, BTreeMap<String, MetricAccumulator>)>;

pub struct TrendEngine;

impl TrendEngine {
    /// 计算趋势
    ///
    /// # 参数
    /// - request: 趋势请求
    /// - units: (单元标识, 该单元的数据行)；按 request.unit 过滤
    pub fn trend<'a, I>(request: &TrendRequest, units: I) -> TrendSeries
    where
        I: IntoIterator<Item = (&'a str, &'a [Row])>,
    {
        let label_filter: Option<HashSet<&str>> = request
            .label_values
            .as_ref()
            .filter(|values| !values.is_empty())
            .map(|values| values.iter().map(|v| v.as_str()).collect());

        let mut buckets: BTreeMap<NaiveDate, LabelBuckets> = BTreeMap::new();

        for (unit, rows) in units {
            if let Some(wanted) = &request.unit {
                if !unit.eq_ignore_ascii_case(wanted.trim()) {
                    continue;
                }
            }

            for row in rows {
                let Some(date) = ColumnResolver::date(row) else {
                    continue;
                };

                let label = label_of(row, unit, request.dimension);
                if let Some(filter) = &label_filter {
                    if !filter.contains(label.as_str()) {
                        continue;
                    }
                }

                let label = output_key(label);
                let machine = output_key(
                    ColumnResolver::machine_name(row).unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                );
                let value = parameter_value(row, &request.parameter);
                let ref_length = ColumnResolver::reference_length(row);
                let yarn_length = ColumnResolver::yarn_length(row);

                let (label_acc, machine_accs) =
                    buckets.entry(date).or_default().entry(label).or_default();
                label_acc.add(value, ref_length, yarn_length);
                machine_accs
                    .entry(machine)
                    .or_default()
                    .add(value, ref_length, yarn_length);
            }
        }

        Self::assemble(request, buckets)
    }

    fn assemble(request: &TrendRequest, buckets: BTreeMap<NaiveDate, LabelBuckets>) -> TrendSeries {
        let finish =
            |acc: &MetricAccumulator| format_ratio(acc.value_for(request.group, &request.parameter));

        let dates: Vec<String> = buckets.keys().map(|d| d.format("%Y-%m-%d").to_string()).collect();

        let mut labels: BTreeSet<String> = BTreeSet::new();
        let mut machines_by_label: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut data = Vec::with_capacity(buckets.len());

        for (date, by_label) in &buckets {
            let mut values = BTreeMap::new();
            let mut machines = BTreeMap::new();

            for (label, (acc, machine_accs)) in by_label {
                labels.insert(label.clone());
                values.insert(label.clone(), finish(acc));

                let label_machines = machines_by_label.entry(label.clone()).or_default();
                let mut machine_values = BTreeMap::new();
                for (machine, machine_acc) in machine_accs {
                    label_machines.insert(machine.clone());
                    machine_values.insert(machine.clone(), finish(machine_acc));
                }
                machines.insert(label.clone(), machine_values);
            }

            data.push(TrendRow {
                date: date.format("%Y-%m-%d").to_string(),
                values,
                machines,
            });
        }

        // 下钻: 每个标签覆盖完整日期序列，无数据的日期只保留日期
        let drill_down_data = machines_by_label
            .into_iter()
            .map(|(label, machines)| {
                let series = data
                    .iter()
                    .map(|row| DrillDownPoint {
                        date: row.date.clone(),
                        values: row.machines.get(&label).cloned().unwrap_or_default(),
                    })
                    .collect();
                let drill = DrillDown {
                    machines: machines.into_iter().collect(),
                    series,
                };
                (label, drill)
            })
            .collect();

        TrendSeries {
            data,
            labels: labels.into_iter().collect(),
            dates,
            drill_down_data,
        }
    }
}

/// 行的分组标签
fn label_of(row: &Row, unit: &str, dimension: LabelDimension) -> String {
    let label = match dimension {
        LabelDimension::Unit => Some(unit.to_string()),
        LabelDimension::ArticleName => ColumnResolver::article_name(row),
        LabelDimension::ArticleNumber => ColumnResolver::article_number(row),
        LabelDimension::LotId => ColumnResolver::lot_id(row),
        LabelDimension::MachineName => ColumnResolver::machine_name(row),
    };
    label.unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// 避免展开后的键覆盖 date / machines 字段
fn output_key(name: String) -> String {
    if RESERVED_KEYS.contains(&name.as_str()) {
        format!("{}_", name)
    } else {
        name
    }
}

/// 行的参数取值: 派生参数或任意列（忽略大小写与空白）
fn parameter_value(row: &Row, parameter: &str) -> f64 {
    let name = parameter.trim();
    if name.eq_ignore_ascii_case(IPI) {
        ColumnResolver::ipi(row)
    } else if name.eq_ignore_ascii_case(HSIPI) {
        ColumnResolver::hsipi(row)
    } else if name.eq_ignore_ascii_case(TOTAL_ALARMS) {
        ColumnResolver::total_alarms(row)
    } else {
        ColumnResolver::find_loose(row, name)
            .and_then(CellValue::as_f64)
            .unwrap_or(0.0)
    }
}
