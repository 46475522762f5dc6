// ==========================================
// 细纱质量分析系统 - 缓存层
// ==========================================
// 职责: 持有单元数据快照，定时 / 按需刷新
// 说明: 纯内存缓存，进程重启后由首次刷新重建
// ==========================================

pub mod error;
pub mod refresher;
pub mod scheduler;
pub mod state;

// 重导出核心类型
pub use error::{CacheError, CacheResult};
pub use refresher::{
    CacheRefresher, RefreshOutcome, RefreshReport, RefreshTrigger, RefresherOptions,
    UnitRefreshReport, UnitRefreshStatus,
};
pub use scheduler::spawn_refresh_loop;
pub use state::{CacheSnapshot, CacheState, UnitSnapshot};
