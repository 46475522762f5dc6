// ==========================================
// QualityApi 集成测试
// ==========================================
// 职责: 经由 API 层验证 live / available-filters / data / trend 的行为
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod quality_api_test {
    use chrono::NaiveDate;
    use spinning_quality_cache::api::{ApiError, FiltersQuery, LiveQuery, TrendQuery};
    use spinning_quality_cache::cache::RefreshOutcome;
    use spinning_quality_cache::domain::ShiftValue;
    use std::sync::Arc;

    use crate::test_helpers::{app_with, seed_all_units, to_csv, MockBlobStore, ShiftRecord};

    fn three_day_records() -> Vec<ShiftRecord> {
        vec![
            ShiftRecord::new("2024-01-01", 1, "M1", 1000.0)
                .article("A1", "Cotton 30s")
                .lot("L1")
                .set("NCuts", 1.0),
            ShiftRecord::new("2024-01-02", 1, "M1", 1000.0)
                .article("A1", "Cotton 30s")
                .lot("L1")
                .set("NCuts", 2.0),
            ShiftRecord::new("2024-01-02", 3, "M2", 1000.0)
                .article("A2", "Poly 40s")
                .lot("L2")
                .set("NCuts", 6.0),
            ShiftRecord::new("2024-01-03", 2, "M1", 1000.0)
                .article("A1", "Cotton 30s")
                .lot("L1")
                .set("NCuts", 8.0),
        ]
    }

    fn seeded_app() -> (Arc<MockBlobStore>, spinning_quality_cache::app::AppState) {
        let store = Arc::new(MockBlobStore::new());
        seed_all_units(&store, &three_day_records());
        let app = app_with(store.clone());
        (store, app)
    }

    // ==========================================
    // live
    // ==========================================

    #[tokio::test]
    async fn test_live_default_uses_latest_date_and_cached_view() {
        let (store, app) = seeded_app();

        let first = app.quality_api.live(LiveQuery::default()).await.unwrap();
        assert_eq!(first.len(), 6);
        let summary = first[0].summary.as_ref().unwrap();
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(summary.shift, Some(ShiftValue::new("2")));

        // 第二次直接命中预计算结果，不再下载
        let second = app.quality_api.live(LiveQuery::default()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.download_count(), 6);
    }

    #[tokio::test]
    async fn test_live_dashboard_mode_uses_second_latest_date() {
        let (_, app) = seeded_app();

        let query = LiveQuery {
            mode: Some("dashboard".into()),
            ..Default::default()
        };
        let view = app.quality_api.live(query).await.unwrap();
        let summary = view[0].summary.as_ref().unwrap();

        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2024, 1, 2));
        // 未指定班次: 取当日最大班次
        assert_eq!(summary.shift, Some(ShiftValue::new("3")));
        assert_eq!(summary.latest_shift, Some(ShiftValue::new("3")));
        assert_eq!(view[0].cut_counts.get("NCuts"), Some(&6));
    }

    #[tokio::test]
    async fn test_live_shift_all_and_unit_filter() {
        let (_, app) = seeded_app();

        let query = LiveQuery {
            date: Some("2024-01-02".into()),
            shift: Some("all".into()),
            unit: Some("unit4".into()),
            ..Default::default()
        };
        let view = app.quality_api.live(query).await.unwrap();

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].label, "unit4");
        assert_eq!(view[0].row_count, 2);
        assert_eq!(view[0].cut_counts.get("NCuts"), Some(&8));
        assert_eq!(view[0].summary.as_ref().unwrap().shift, None);
    }

    #[tokio::test]
    async fn test_live_date_without_data_returns_empty_aggregates() {
        let (_, app) = seeded_app();

        let query = LiveQuery {
            date: Some("2023-12-31".into()),
            ..Default::default()
        };
        let view = app.quality_api.live(query).await.unwrap();

        assert_eq!(view.len(), 6);
        assert!(view.iter().all(|u| u.row_count == 0));
        assert_eq!(view[0].summary.as_ref().unwrap().yarn_faults, "N/A");
    }

    #[tokio::test]
    async fn test_live_rejects_unknown_unit() {
        let (_, app) = seeded_app();

        let query = LiveQuery {
            unit: Some("unit9".into()),
            ..Default::default()
        };
        let err = app.quality_api.live(query).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    // ==========================================
    // available-filters / data
    // ==========================================

    #[tokio::test]
    async fn test_available_filters() {
        let (store, app) = seeded_app();
        store.put_unit(
            "unit2",
            to_csv(&[ShiftRecord::new("2024-02-01", 1, "M9", 1000.0).lot("L9")]),
        );

        let all = app
            .quality_api
            .available_filters(FiltersQuery::default())
            .await
            .unwrap();
        assert_eq!(
            all.dates,
            vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-02-01"]
        );
        assert_eq!(all.shifts, vec!["1", "2", "3"]);
        assert_eq!(all.machines, vec!["M1", "M2", "M9"]);
        assert_eq!(all.articles, vec!["A1", "A2"]);
        assert_eq!(all.article_names, vec!["Cotton 30s", "Poly 40s"]);
        assert_eq!(all.lot_ids, vec!["L1", "L2", "L9"]);

        let unit2 = app
            .quality_api
            .available_filters(FiltersQuery {
                unit: Some("unit2".into()),
            })
            .await
            .unwrap();
        assert_eq!(unit2.dates, vec!["2024-02-01"]);
        assert_eq!(unit2.machines, vec!["M9"]);
    }

    #[tokio::test]
    async fn test_unit_data_bypasses_cache() {
        let (store, app) = seeded_app();
        app.quality_api.live(LiveQuery::default()).await.unwrap();

        store.put_unit(
            "unit5",
            to_csv(&[ShiftRecord::new("2024-03-01", 1, "M1", 1000.0)]),
        );
        let rows = app.quality_api.unit_data("unit5").await.unwrap();
        assert_eq!(rows.len(), 1);

        // 缓存不受影响
        let snapshot = app.refresher.state().snapshot();
        assert_eq!(snapshot.unit_rows("unit5").len(), 4);
    }

    #[tokio::test]
    async fn test_unit_data_errors() {
        let store = Arc::new(MockBlobStore::new());
        let app = app_with(store.clone());

        let missing = app.quality_api.unit_data("unit1").await.unwrap_err();
        assert!(matches!(missing, ApiError::NotFound(_)));

        store.put_unit("unit1", String::new());
        store.fail_unit("unit1");
        let outage = app.quality_api.unit_data("unit1").await.unwrap_err();
        assert_eq!(outage.status_code(), 502);

        let unknown = app.quality_api.unit_data("unit0").await.unwrap_err();
        assert_eq!(unknown.status_code(), 404);
    }

    // ==========================================
    // trend
    // ==========================================

    #[tokio::test]
    async fn test_trend_cuts_per_100km_by_machine() {
        let (_, app) = seeded_app();

        let query = TrendQuery {
            group: Some("cmt".into()),
            first_column: Some("MachineName".into()),
            parameter: Some("NCuts".into()),
            unit: Some("unit1".into()),
            filter_values: None,
        };
        let series = app.quality_api.trend(query).await.unwrap();

        assert_eq!(series.dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(series.labels, vec!["M1", "M2"]);
        // 2 cuts / 1000 m × 100
        assert_eq!(series.data[1].values["M1"], "0.20");
        assert_eq!(series.data[1].values["M2"], "0.60");
        assert!(!series.data[0].values.contains_key("M2"));

        let drill = &series.drill_down_data["M2"];
        assert_eq!(drill.series.len(), 3);
        assert!(drill.series[0].values.is_empty());
    }

    #[tokio::test]
    async fn test_trend_label_filter_across_units() {
        let (_, app) = seeded_app();

        let query = TrendQuery {
            group: Some("alarms".into()),
            first_column: Some("unit".into()),
            parameter: Some("NCuts".into()),
            unit: None,
            filter_values: Some("unit1,unit6".into()),
        };
        let series = app.quality_api.trend(query).await.unwrap();

        assert_eq!(series.labels, vec!["unit1", "unit6"]);
        // 原始合计
        assert_eq!(series.data[2].values["unit6"], "8.00");
    }

    #[tokio::test]
    async fn test_trend_missing_parameter_is_bad_request() {
        let (_, app) = seeded_app();

        let query = TrendQuery {
            first_column: Some("MachineName".into()),
            ..Default::default()
        };
        let err = app.quality_api.trend(query).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    // ==========================================
    // health / refresh
    // ==========================================

    #[tokio::test]
    async fn test_health_and_manual_refresh() {
        let (_, app) = seeded_app();
        assert_eq!(app.quality_api.health().status, "empty");

        let outcome = app.quality_api.refresh().await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Completed(_)));

        let health = app.quality_api.health();
        assert_eq!(health.status, "ok");
        assert!(health.last_fetch_time.is_some());
        assert_eq!(health.units.get("unit1"), Some(&4));
    }
}
