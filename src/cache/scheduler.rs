// ==========================================
// 细纱质量分析系统 - 定时刷新
// ==========================================
// 职责: 按固定间隔触发缓存刷新（启动时立即执行第一次）
// ==========================================

use crate::cache::refresher::{CacheRefresher, RefreshOutcome, RefreshTrigger};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 启动后台定时刷新任务
///
/// # 参数
/// - refresher: 缓存刷新器
/// - interval: 刷新间隔
pub fn spawn_refresh_loop(refresher: Arc<CacheRefresher>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 上一次刷新超时占用了间隔时，不补发积压的触发
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match refresher.refresh(RefreshTrigger::Scheduled).await {
                Ok(RefreshOutcome::Completed(report)) => {
                    tracing::debug!(
                        refresh_id = %report.refresh_id,
                        loaded = report.loaded_count(),
                        "定时刷新完成"
                    );
                }
                Ok(RefreshOutcome::Skipped) => {}
                Err(e) => {
                    // 等待下一个周期重试
                    tracing::error!(error = %e, "定时刷新失败");
                }
            }
        }
    })
}
