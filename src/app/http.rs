// ==========================================
// 细纱质量分析系统 - HTTP 路由
// ==========================================
// 职责: 把 QualityApi 暴露为只读 HTTP 接口
// 路由:
//   GET  /live               实时三级指标
//   GET  /available-filters  可选过滤值
//   GET  /data/{unit}        单元原始数据（绕过缓存）
//   GET  /trend              趋势
//   GET  /health             健康检查
//   POST /refresh            人工刷新
// ==========================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::api::{ApiError, FiltersQuery, LiveQuery, TrendQuery};
use crate::app::state::AppState;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "请求处理失败");
        } else {
            tracing::debug!(error = %self, "请求被拒绝");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/live", get(live))
        .route("/available-filters", get(available_filters))
        .route("/data/{unit}", get(unit_data))
        .route("/trend", get(trend))
        .route("/health", get(health))
        .route("/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn live(
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quality_api.live(query).await?))
}

async fn available_filters(
    State(state): State<AppState>,
    Query(query): Query<FiltersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quality_api.available_filters(query).await?))
}

async fn unit_data(
    State(state): State<AppState>,
    Path(unit): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quality_api.unit_data(&unit).await?))
}

async fn trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quality_api.trend(query).await?))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.quality_api.health())
}

async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quality_api.refresh().await?))
}

/// 启动 HTTP 服务（阻塞直到服务退出）
pub async fn run_server(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "HTTP 服务已启动");

    axum::serve(listener, app).await?;
    Ok(())
}
