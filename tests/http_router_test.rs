// ==========================================
// HTTP 路由测试
// ==========================================
// 职责: 验证路由、查询参数绑定与错误响应格式
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod http_router_test {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use spinning_quality_cache::app::router;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::test_helpers::{app_with, seed_all_units, MockBlobStore, ShiftRecord};

    fn test_router() -> Router {
        let store = Arc::new(MockBlobStore::new());
        seed_all_units(
            &store,
            &[
                ShiftRecord::new("2024-01-01", 1, "M1", 1000.0).set("NCuts", 1.0),
                ShiftRecord::new("2024-01-02", 2, "M1", 1000.0).set("NCuts", 3.0),
            ],
        );
        router(app_with(store))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_live_endpoint() {
        let (status, body) = send(test_router(), "GET", "/live?unit=unit2").await;

        assert_eq!(status, StatusCode::OK);
        let units = body.as_array().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0]["label"], "unit2");
        assert_eq!(units[0]["date"], "2024-01-02");
        assert_eq!(units[0]["cuts"]["NCuts"], "0.30");
        assert_eq!(units[0]["yarnFaults"], "0.00");
    }

    #[tokio::test]
    async fn test_live_bad_date_is_bad_request() {
        let (status, body) = send(test_router(), "GET", "/live?date=yesterday").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("yesterday"));
    }

    #[tokio::test]
    async fn test_available_filters_endpoint() {
        let (status, body) = send(test_router(), "GET", "/available-filters").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dates"], serde_json::json!(["2024-01-01", "2024-01-02"]));
        assert_eq!(body["units"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_data_endpoint() {
        let (status, body) = send(test_router(), "GET", "/data/unit3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["MachineName"], "M1");

        let (status, _) = send(test_router(), "GET", "/data/unit42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trend_endpoint() {
        let (status, body) = send(
            test_router(),
            "GET",
            "/trend?group=cuts&firstColumn=MachineName&parameter=NCuts&unit=unit1",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"], serde_json::json!(["M1"]));
        assert_eq!(body["data"][0]["M1"], "0.10");
        assert!(body["drillDownData"]["M1"]["machines"].is_array());

        let (status, body) = send(test_router(), "GET", "/trend?group=cuts").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("firstColumn"));
    }

    #[tokio::test]
    async fn test_health_and_refresh_endpoints() {
        let app = test_router();

        let (status, body) = send(app.clone(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "empty");

        let (status, body) = send(app.clone(), "POST", "/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "COMPLETED");
        assert_eq!(body["units"].as_array().unwrap().len(), 6);

        let (_, body) = send(app, "GET", "/health").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["units"]["unit1"], 2);
    }
}
