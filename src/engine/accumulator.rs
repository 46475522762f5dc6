// ==========================================
// 细纱质量分析系统 - 度量累加器
// ==========================================
// 职责: 切断率与质量值的唯一中间结构
// 复用: 单元 / 品种 / 机台 三级聚合与趋势分桶使用同一累加器
// ==========================================

use crate::domain::columns::is_average_parameter;
use crate::domain::types::GroupKind;

/// 度量累加器 {sum, count, ref_length, yarn_length}
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricAccumulator {
    pub sum: f64,
    pub count: u64,
    pub ref_length: f64,
    pub yarn_length: f64,
}

impl MetricAccumulator {
    /// 累加一行
    pub fn add(&mut self, value: f64, ref_length: f64, yarn_length: f64) {
        self.sum += value;
        self.count += 1;
        self.ref_length += ref_length;
        self.yarn_length += yarn_length;
    }

    /// 每百公里（sum / yarn_length × 100）
    pub fn per_100km(&self) -> f64 {
        ratio(self.sum, self.yarn_length) * 100.0
    }

    /// 按行数取均值
    pub fn mean(&self) -> f64 {
        ratio(self.sum, self.count as f64)
    }

    /// 按参考长度归一（sum / ref_length）
    pub fn per_ref_length(&self) -> f64 {
        ratio(self.sum, self.ref_length)
    }

    /// 质量值：CV/H 取均值，其余按参考长度归一
    pub fn quality_value(&self, column: &str) -> f64 {
        if is_average_parameter(column) {
            self.mean()
        } else {
            self.per_ref_length()
        }
    }

    /// 趋势桶最终取值
    pub fn value_for(&self, group: GroupKind, parameter: &str) -> f64 {
        match group {
            GroupKind::Quality => self.quality_value(parameter),
            GroupKind::Cuts => self.per_100km(),
            GroupKind::Alarms => self.sum,
        }
    }
}

/// 分母为 0 时取 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// 比率统一保留两位小数（字符串）
pub fn format_ratio(value: f64) -> String {
    if !value.is_finite() || value.abs() < 0.005 {
        return "0.00".to_string();
    }
    format!("{:.2}", value)
}
