// ==========================================
// 细纱质量分析系统 - 导出文件解析器
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv)
// 输入: 内存中的文件字节（来自 Blob 存储）
// 输出: 有序数据行，日期单元格转换为日历日期
// ==========================================

use crate::domain::row::{CellValue, Row};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, DataType, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use std::io::Cursor;

/// 解析器接口：字节 → 数据行
pub trait FileParser {
    fn parse_rows(&self, bytes: &[u8]) -> ImportResult<Vec<Row>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, bytes: &[u8]) -> ImportResult<Vec<Row>> {
        // 去掉 UTF-8 BOM
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = Row::with_capacity(headers.len());

            for (col_idx, value) in record.iter().enumerate() {
                match headers.get(col_idx) {
                    Some(header) if !header.is_empty() => {
                        row.insert(header.clone(), csv_cell(value));
                    }
                    _ => {}
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

/// CSV 单元格: 数字按数值保存，其余保留文本
fn csv_cell(raw: &str) -> CellValue {
    let value = raw.trim();
    if value.is_empty() {
        return CellValue::Empty;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(value.to_string()),
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, bytes: &[u8]) -> ImportResult<Vec<Row>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or(ImportError::MissingHeader)?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let mut row = Row::with_capacity(headers.len());

            for (col_idx, cell) in data_row.iter().enumerate() {
                match headers.get(col_idx) {
                    Some(header) if !header.is_empty() => {
                        row.insert(header.clone(), excel_cell(cell));
                    }
                    _ => {}
                }
            }

            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

/// Excel 单元格转换；日期单元格午夜时刻折叠为日历日期
fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::DateTime(_) => cell
            .as_datetime()
            .map(date_or_datetime)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(date_or_datetime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn date_or_datetime(dt: NaiveDateTime) -> CellValue {
    if dt.time() == NaiveTime::MIN {
        CellValue::Date(dt.date())
    } else {
        CellValue::DateTime(dt)
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

// ==========================================
// 通用解析器（按文件头自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// xlsx 是 ZIP 容器，以 `PK` 开头；其余按 CSV 文本处理
    pub fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<Row>> {
        if bytes.starts_with(b"PK\x03\x04") {
            ExcelParser.parse_rows(bytes)
        } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            // 旧版 .xls（OLE2）
            Err(ImportError::UnsupportedFormat("xls".to_string()))
        } else {
            CsvParser.parse_rows(bytes)
        }
    }
}
