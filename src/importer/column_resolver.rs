// ==========================================
// 细纱质量分析系统 - 列解析器
// ==========================================
// 职责: 在松散类型的数据行上按规范列名取值
// 规则: 大小写不敏感的精确匹配；缺失取零值
//       身份字段按别名优先级尝试，首个非空值生效
// 性能: 聚合时每行每列都会调用，查找过程不分配内存
// ==========================================

use crate::domain::columns::{self, HSIPI_SOURCES, IPI_SOURCES};
use crate::domain::row::{format_number, CellValue, Row};
use crate::domain::types::ShiftValue;
use chrono::NaiveDate;

pub struct ColumnResolver;

impl ColumnResolver {
    /// 按规范列名查找单元格（大小写不敏感的精确匹配）
    pub fn find<'r>(row: &'r Row, canonical: &str) -> Option<&'r CellValue> {
        row.fields()
            .find(|(k, _)| k.eq_ignore_ascii_case(canonical))
            .map(|(_, v)| v)
    }

    /// 数值列取值，缺失或无法解析时为 0
    pub fn number(row: &Row, canonical: &str) -> f64 {
        Self::find(row, canonical)
            .and_then(CellValue::as_f64)
            .unwrap_or(0.0)
    }

    /// 文本列取值，缺失时为空串
    pub fn text(row: &Row, canonical: &str) -> String {
        Self::find(row, canonical)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// 多别名查找：依次尝试，返回首个非空单元格
    pub fn first_present<'r>(row: &'r Row, candidates: &[&str]) -> Option<&'r CellValue> {
        candidates
            .iter()
            .filter_map(|c| Self::find(row, c))
            .find(|v| !v.is_blank())
    }

    /// 多别名文本取值
    pub fn first_text(row: &Row, candidates: &[&str]) -> Option<String> {
        Self::first_present(row, candidates).map(|v| match v {
            CellValue::Number(n) => format_number(*n),
            other => other.to_string(),
        })
    }

    /// 多别名数值取值：首个可解析为数值的别名生效
    pub fn first_number(row: &Row, candidates: &[&str]) -> f64 {
        candidates
            .iter()
            .filter_map(|c| Self::find(row, c))
            .find_map(CellValue::as_f64)
            .unwrap_or(0.0)
    }

    /// 按列名查找，同时忽略大小写和空白（趋势参数用）
    pub fn find_loose<'r>(row: &'r Row, name: &str) -> Option<&'r CellValue> {
        row.fields()
            .find(|(k, _)| loose_eq(k, name))
            .map(|(_, v)| v)
    }

    // ==========================================
    // 身份字段
    // ==========================================

    pub fn article_number(row: &Row) -> Option<String> {
        Self::first_text(row, columns::ARTICLE_NUMBER)
    }

    pub fn article_name(row: &Row) -> Option<String> {
        Self::first_text(row, columns::ARTICLE_NAME)
    }

    pub fn machine_name(row: &Row) -> Option<String> {
        Self::first_text(row, columns::MACHINE_NAME)
    }

    pub fn lot_id(row: &Row) -> Option<String> {
        Self::first_text(row, columns::LOT_ID)
    }

    pub fn shift(row: &Row) -> Option<ShiftValue> {
        Self::first_text(row, columns::SHIFT_NUMBER).map(ShiftValue::new)
    }

    /// 行日期：`Date` 优先，其次班次开始时间
    pub fn date(row: &Row) -> Option<NaiveDate> {
        columns::DATE
            .iter()
            .filter_map(|c| Self::find(row, c))
            .find_map(CellValue::as_date)
    }

    // ==========================================
    // 度量字段
    // ==========================================

    pub fn yarn_length(row: &Row) -> f64 {
        Self::number(row, columns::YARN_LENGTH)
    }

    pub fn yarn_faults(row: &Row) -> f64 {
        Self::number(row, columns::YARN_FAULTS)
    }

    /// 参考长度：IPRefLength，缺失时回退 RefLength
    pub fn reference_length(row: &Row) -> f64 {
        Self::first_number(row, columns::REFERENCE_LENGTH)
    }

    pub fn total_cuts(row: &Row) -> f64 {
        Self::first_number(row, columns::TOTAL_CUTS)
    }

    pub fn ipi(row: &Row) -> f64 {
        IPI_SOURCES.iter().map(|c| Self::number(row, c)).sum()
    }

    pub fn hsipi(row: &Row) -> f64 {
        HSIPI_SOURCES.iter().map(|c| Self::number(row, c)).sum()
    }

    /// 11 个报警列合计
    pub fn total_alarms(row: &Row) -> f64 {
        columns::ALARM_COLUMNS
            .iter()
            .map(|c| Self::number(row, c))
            .sum()
    }

    /// 质量列取值（IPI/HSIPI 逐行派生，其余直接读列）
    pub fn quality_value(row: &Row, column: &str) -> f64 {
        if column.eq_ignore_ascii_case(columns::IPI) {
            Self::ipi(row)
        } else if column.eq_ignore_ascii_case(columns::HSIPI) {
            Self::hsipi(row)
        } else {
            Self::number(row, column)
        }
    }
}

/// 忽略大小写与空白比较两个列名
fn loose_eq(a: &str, b: &str) -> bool {
    let mut left = a.chars().filter(|c| !c.is_whitespace());
    let mut right = b.chars().filter(|c| !c.is_whitespace());
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.to_lowercase().eq(y.to_lowercase()) => continue,
            _ => return false,
        }
    }
}
