// Small ops utility: run a single cache refresh against the configured blob source
// and print the refresh report as JSON.
//
// Usage:
//   SQC_BLOB_DIR=/path/to/exports refresh_once
//
// Exits non-zero when no unit could be loaded.

use spinning_quality_cache::app::AppState;
use spinning_quality_cache::cache::{RefreshOutcome, RefreshTrigger};
use spinning_quality_cache::config::ServiceConfig;
use spinning_quality_cache::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();
    logging::init_with_format(config.log_format);

    let state = AppState::new(&config);
    let outcome = state.refresher.refresh(RefreshTrigger::Manual).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let RefreshOutcome::Completed(report) = &outcome {
        let snapshot = state.refresher.state().snapshot();
        if let Some(view) = &snapshot.default_view {
            println!("{}", serde_json::to_string_pretty(view.as_ref())?);
        }
        tracing::info!(
            loaded = report.loaded_count(),
            total = report.units.len(),
            "刷新完成"
        );
    }

    Ok(())
}
