// ==========================================
// 细纱质量分析系统 - 领域类型定义
// ==========================================
// 职责: 生产单元、班次、趋势分组等值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ==========================================
// 生产单元 (Unit)
// ==========================================
// 固定六个单元，每个单元对应一个导出文件
pub const UNIT_IDS: [&str; 6] = ["unit1", "unit2", "unit3", "unit4", "unit5", "unit6"];

/// 规范化单元标识（大小写不敏感），未知单元返回 None
pub fn canonical_unit(unit: &str) -> Option<&'static str> {
    let unit = unit.trim();
    UNIT_IDS.iter().copied().find(|u| u.eq_ignore_ascii_case(unit))
}

// ==========================================
// 班次值 (Shift)
// ==========================================
// 导出中班次可能是数字也可能是文本，统一按文本保存，比较时优先按数值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftValue(String);

impl ShiftValue {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl fmt::Display for ShiftValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for ShiftValue {
    // 两边都是数字时按数值比较；否则数字排在文本之前，文本之间按字典序
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a
                .partial_cmp(&b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ShiftValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ==========================================
// 班次过滤 (Shift Filter)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftFilter {
    /// 显式通配 `all`：不做班次过滤
    All,
    /// 指定班次
    Value(ShiftValue),
}

impl ShiftFilter {
    /// 解析查询参数；空串视为未指定
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.eq_ignore_ascii_case("all") {
            Some(ShiftFilter::All)
        } else {
            Some(ShiftFilter::Value(ShiftValue::new(raw)))
        }
    }
}

// ==========================================
// 趋势分组类型 (Group Kind)
// ==========================================
// 决定趋势桶的取值公式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Quality, // 质量: CV/H 取均值，其它除以参考长度
    Cuts,    // 切断: 每百公里
    Alarms,  // 报警及其它: 原始合计
}

impl GroupKind {
    /// `cmt` 与 `cuts` 同义；未知分组按原始合计处理
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quality" => GroupKind::Quality,
            "cuts" | "cmt" => GroupKind::Cuts,
            _ => GroupKind::Alarms,
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Quality => write!(f, "quality"),
            GroupKind::Cuts => write!(f, "cuts"),
            GroupKind::Alarms => write!(f, "alarms"),
        }
    }
}

// ==========================================
// 趋势标签维度 (Label Dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelDimension {
    Unit,
    ArticleName,
    ArticleNumber,
    LotId,
    MachineName,
}

impl LabelDimension {
    /// 解析 `firstColumn` 参数（大小写、空白不敏感）
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "unit" | "units" => Some(LabelDimension::Unit),
            "articlename" => Some(LabelDimension::ArticleName),
            "articlenumber" | "articleno" | "article" => Some(LabelDimension::ArticleNumber),
            "lotid" | "lot" => Some(LabelDimension::LotId),
            "machinename" | "machine" => Some(LabelDimension::MachineName),
            _ => None,
        }
    }
}

impl fmt::Display for LabelDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelDimension::Unit => write!(f, "unit"),
            LabelDimension::ArticleName => write!(f, "ArticleName"),
            LabelDimension::ArticleNumber => write!(f, "ArticleNumber"),
            LabelDimension::LotId => write!(f, "LotID"),
            LabelDimension::MachineName => write!(f, "MachineName"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_ordering_numeric_first() {
        let mut shifts = vec![
            ShiftValue::new("10"),
            ShiftValue::new("2"),
            ShiftValue::new("C"),
            ShiftValue::new("3"),
        ];
        shifts.sort();
        let ordered: Vec<&str> = shifts.iter().map(|s| s.as_str()).collect();
        assert_eq!(ordered, vec!["2", "3", "10", "C"]);
    }

    #[test]
    fn test_shift_filter_parse() {
        assert_eq!(ShiftFilter::parse("ALL"), Some(ShiftFilter::All));
        assert_eq!(ShiftFilter::parse("  "), None);
        assert_eq!(
            ShiftFilter::parse("2"),
            Some(ShiftFilter::Value(ShiftValue::new("2")))
        );
    }

    #[test]
    fn test_group_kind_aliases() {
        assert_eq!(GroupKind::parse("CMT"), GroupKind::Cuts);
        assert_eq!(GroupKind::parse("quality"), GroupKind::Quality);
        assert_eq!(GroupKind::parse("anything"), GroupKind::Alarms);
    }

    #[test]
    fn test_label_dimension_parse() {
        assert_eq!(LabelDimension::parse("LotID"), Some(LabelDimension::LotId));
        assert_eq!(
            LabelDimension::parse("Machine Name"),
            Some(LabelDimension::MachineName)
        );
        assert_eq!(LabelDimension::parse("colour"), None);
    }

    #[test]
    fn test_canonical_unit() {
        assert_eq!(canonical_unit("UNIT3"), Some("unit3"));
        assert_eq!(canonical_unit("unit9"), None);
    }
}
