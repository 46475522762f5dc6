// ==========================================
// 细纱质量分析系统 - 服务主入口
// ==========================================
// 启动顺序: 加载配置 → 初始化日志 → 启动定时刷新 → 启动 HTTP 服务
// ==========================================

use spinning_quality_cache::app::{run_server, AppState};
use spinning_quality_cache::cache::spawn_refresh_loop;
use spinning_quality_cache::config::ServiceConfig;
use spinning_quality_cache::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();

    // 初始化日志系统
    logging::init_with_format(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{} - 质量指标缓存服务", spinning_quality_cache::APP_NAME);
    tracing::info!("系统版本: {}", spinning_quality_cache::VERSION);
    tracing::info!("==================================================");
    tracing::info!(
        refresh_interval_secs = config.refresh_interval.as_secs(),
        unit_timeout_secs = config.unit_timeout.as_secs(),
        min_yarn_length = config.min_yarn_length,
        "服务配置已加载"
    );

    let app_state = AppState::new(&config);

    // 定时刷新（首次刷新立即执行）
    let refresh_task = spawn_refresh_loop(app_state.refresher.clone(), config.refresh_interval);

    let result = run_server(app_state, &config.bind_addr).await;

    refresh_task.abort();
    tracing::info!("服务已退出");
    result
}
