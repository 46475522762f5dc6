// ==========================================
// 日志系统初始化
// ==========================================
// 输出: 文本（默认）或 JSON 行（SQC_LOG_FORMAT=json）
// 级别: RUST_LOG，未设置时为 info
// 重复初始化时静默忽略（测试中多次调用）
// ==========================================

use crate::config::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "info";
const TEST_DIRECTIVE: &str = "spinning_quality_cache=debug";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 文本格式日志
///
/// # 示例
/// ```no_run
/// spinning_quality_cache::logging::init();
/// ```
pub fn init() {
    let _ = fmt()
        .with_env_filter(filter_or(DEFAULT_DIRECTIVE))
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// JSON 行格式日志（便于日志采集）
pub fn init_json() {
    let _ = fmt()
        .json()
        .with_env_filter(filter_or(DEFAULT_DIRECTIVE))
        .with_current_span(false)
        .flatten_event(true)
        .try_init();
}

/// 按服务配置选择日志格式
pub fn init_with_format(format: LogFormat) {
    match format {
        LogFormat::Text => init(),
        LogFormat::Json => init_json(),
    }
}

/// 测试日志: 本 crate 输出 debug，写入测试捕获的输出
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(filter_or(TEST_DIRECTIVE))
        .with_test_writer()
        .try_init();
}
