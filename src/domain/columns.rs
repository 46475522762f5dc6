// ==========================================
// 细纱质量分析系统 - 标准列定义
// ==========================================
// 职责: 报警列 / 切断列 / 质量列 的规范列名，以及身份字段的历史别名
// 说明: 顺序即输出顺序
// ==========================================

/// 报警列（11 列）
pub const ALARM_COLUMNS: [&str; 11] = [
    "NSLTAlarms",
    "CCpAlarms",
    "CCmAlarms",
    "CVpAlarms",
    "CVmAlarms",
    "HpAlarms",
    "HmAlarms",
    "PFAlarms",
    "FDAlarms",
    "PPAlarms",
    "SpliceAlarms",
];

/// 切断列（9 列）
pub const CUT_COLUMNS: [&str; 9] = [
    "NCuts", "SCuts", "LCuts", "TCuts", "CCpCuts", "CCmCuts", "CVpCuts", "FDCuts", "PPCuts",
];

/// 质量列（7 列，IPI 与 HSIPI 为逐行派生）
pub const QUALITY_COLUMNS: [&str; 7] = ["CV", "H", "Thin50", "Thick50", "Nep200", "IPI", "HSIPI"];

pub const IPI: &str = "IPI";
pub const HSIPI: &str = "HSIPI";
pub const TOTAL_ALARMS: &str = "totalAlarms";

/// IPI = Thin50 + Thick50 + Nep200
pub const IPI_SOURCES: [&str; 3] = ["Thin50", "Thick50", "Nep200"];

/// HSIPI = Thin40 + Thick35 + Nep140
pub const HSIPI_SOURCES: [&str; 3] = ["Thin40", "Thick35", "Nep140"];

pub const YARN_LENGTH: &str = "YarnLength";
pub const YARN_FAULTS: &str = "YarnFaults";

/// 直接取均值的质量参数（CV、H）
pub fn is_average_parameter(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("CV") || name.trim().eq_ignore_ascii_case("H")
}

// ==========================================
// 身份字段别名（按优先级排列，首个非空值生效）
// ==========================================

pub const ARTICLE_NUMBER: &[&str] = &["ArticleNumber", "ArticleNo", "Article Number", "Article"];
pub const ARTICLE_NAME: &[&str] = &["ArticleName", "Article Name", "ArticleDescription"];
pub const MACHINE_NAME: &[&str] = &["MachineName", "Machine Name", "Machine", "MachineNo"];
pub const LOT_ID: &[&str] = &["LotID", "Lot ID", "LotNumber", "Lot"];
pub const SHIFT_NUMBER: &[&str] = &["ShiftNumber", "Shift Number", "Shift", "ShiftNo"];
pub const DATE: &[&str] = &["Date", "ShiftStartTime", "Shift Start Time", "ShiftDate"];
pub const REFERENCE_LENGTH: &[&str] = &["IPRefLength", "RefLength"];
pub const TOTAL_CUTS: &[&str] = &["TotalCuts", "Cuts", "YarnCuts"];

/// 缺省标签
pub const UNKNOWN_LABEL: &str = "Unknown";
