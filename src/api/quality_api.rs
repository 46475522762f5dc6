// ==========================================
// 细纱质量分析系统 - 质量指标 API
// ==========================================
// 职责: live / available-filters / data/:unit / trend 的业务入口
// 架构: API 层 → 缓存快照 → 引擎层（纯计算）
// 说明: 读请求发现缓存为空时触发一次按需刷新
// ==========================================

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::dto::{
    non_blank, AvailableFilters, FiltersQuery, HealthResponse, LiveQuery, TrendQuery,
};
use crate::api::error::{ApiError, ApiResult};
use crate::cache::refresher::{CacheRefresher, RefreshOutcome, RefreshTrigger};
use crate::domain::aggregate::Aggregate;
use crate::domain::row::Row;
use crate::domain::types::{
    canonical_unit, GroupKind, LabelDimension, ShiftFilter, ShiftValue, UNIT_IDS,
};
use crate::engine::aggregation::AggregationEngine;
use crate::engine::filter_resolver::FilterRequest;
use crate::engine::live::live_view;
use crate::engine::trend::{TrendEngine, TrendRequest, TrendSeries};
use crate::importer::column_resolver::ColumnResolver;
use crate::importer::dataset_loader::DatasetLoader;

// ==========================================
// QualityApi - 质量指标 API
// ==========================================
pub struct QualityApi {
    refresher: Arc<CacheRefresher>,
    loader: Arc<DatasetLoader>,
    engine: AggregationEngine,
}

impl QualityApi {
    pub fn new(
        refresher: Arc<CacheRefresher>,
        loader: Arc<DatasetLoader>,
        engine: AggregationEngine,
    ) -> Self {
        Self {
            refresher,
            loader,
            engine,
        }
    }

    /// 实时指标
    ///
    /// # 返回
    /// - 无任何参数: 直接返回刷新时预计算的默认视图
    /// - 其它: 按过滤条件现算
    pub async fn live(&self, query: LiveQuery) -> ApiResult<Arc<Vec<Aggregate>>> {
        let request = parse_live_query(&query)?;
        let snapshot = self.refresher.ensure_loaded().await?;

        if request.is_default_view() {
            if let Some(view) = &snapshot.default_view {
                return Ok(view.clone());
            }
        }

        Ok(Arc::new(live_view(
            snapshot.iter_units(),
            &request,
            &self.engine,
        )))
    }

    /// 可选过滤值
    pub async fn available_filters(&self, query: FiltersQuery) -> ApiResult<AvailableFilters> {
        let unit = non_blank(&query.unit).map(require_unit).transpose()?;
        let snapshot = self.refresher.ensure_loaded().await?;

        let rows: Vec<&Row> = match unit {
            Some(unit) => snapshot.unit_rows(unit).iter().collect(),
            None => snapshot
                .iter_units()
                .flat_map(|(_, rows)| rows.iter())
                .collect(),
        };

        Ok(collect_filters(&rows))
    }

    /// 单元原始数据（直接下载，不经过缓存）
    pub async fn unit_data(&self, unit: &str) -> ApiResult<Vec<Row>> {
        let unit = require_unit(unit)?;
        Ok(self.loader.load_unit(unit).await?)
    }

    /// 趋势
    pub async fn trend(&self, query: TrendQuery) -> ApiResult<TrendSeries> {
        let request = parse_trend_query(&query)?;
        let snapshot = self.refresher.ensure_loaded().await?;
        Ok(TrendEngine::trend(&request, snapshot.iter_units()))
    }

    /// 健康检查（不触发刷新）
    pub fn health(&self) -> HealthResponse {
        let snapshot = self.refresher.state().snapshot();
        HealthResponse {
            status: if snapshot.is_empty() { "empty" } else { "ok" },
            last_fetch_time: snapshot.last_fetch_time,
            units: snapshot.row_counts(),
        }
    }

    /// 人工刷新
    pub async fn refresh(&self) -> ApiResult<RefreshOutcome> {
        Ok(self.refresher.refresh(RefreshTrigger::Manual).await?)
    }
}

// ==========================================
// 参数解析
// ==========================================

fn require_unit(unit: &str) -> ApiResult<&'static str> {
    canonical_unit(unit).ok_or_else(|| ApiError::NotFound(format!("未知单元: {}", unit.trim())))
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput(format!("日期格式错误（期望 YYYY-MM-DD）: {}", raw)))
}

pub(crate) fn parse_live_query(query: &LiveQuery) -> ApiResult<FilterRequest> {
    Ok(FilterRequest {
        date: non_blank(&query.date).map(parse_date).transpose()?,
        shift: non_blank(&query.shift).and_then(ShiftFilter::parse),
        unit: non_blank(&query.unit)
            .map(|u| require_unit(u).map(str::to_string))
            .transpose()?,
        machine: non_blank(&query.machine).map(str::to_string),
        dashboard: non_blank(&query.mode)
            .map(|m| m.eq_ignore_ascii_case("dashboard"))
            .unwrap_or(false),
    })
}

pub(crate) fn parse_trend_query(query: &TrendQuery) -> ApiResult<TrendRequest> {
    let first_column =
        non_blank(&query.first_column).ok_or(ApiError::MissingParameter("firstColumn"))?;
    let parameter = non_blank(&query.parameter).ok_or(ApiError::MissingParameter("parameter"))?;

    let dimension = LabelDimension::parse(first_column)
        .ok_or_else(|| ApiError::InvalidInput(format!("不支持的分组列: {}", first_column)))?;

    let label_values = non_blank(&query.filter_values).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    Ok(TrendRequest {
        group: GroupKind::parse(non_blank(&query.group).unwrap_or_default()),
        dimension,
        parameter: parameter.to_string(),
        unit: non_blank(&query.unit)
            .map(|u| require_unit(u).map(str::to_string))
            .transpose()?,
        label_values,
    })
}

/// 去重升序的可选过滤值
pub(crate) fn collect_filters(rows: &[&Row]) -> AvailableFilters {
    let mut dates = BTreeSet::new();
    let mut shifts: BTreeSet<ShiftValue> = BTreeSet::new();
    let mut machines = BTreeSet::new();
    let mut articles = BTreeSet::new();
    let mut article_names = BTreeSet::new();
    let mut lot_ids = BTreeSet::new();

    for row in rows {
        if let Some(date) = ColumnResolver::date(row) {
            dates.insert(date);
        }
        if let Some(shift) = ColumnResolver::shift(row) {
            shifts.insert(shift);
        }
        if let Some(machine) = ColumnResolver::machine_name(row) {
            machines.insert(machine);
        }
        if let Some(article) = ColumnResolver::article_number(row) {
            articles.insert(article);
        }
        if let Some(name) = ColumnResolver::article_name(row) {
            article_names.insert(name);
        }
        if let Some(lot) = ColumnResolver::lot_id(row) {
            lot_ids.insert(lot);
        }
    }

    AvailableFilters {
        dates: dates
            .into_iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        shifts: shifts.into_iter().map(|s| s.to_string()).collect(),
        units: UNIT_IDS.iter().map(|u| u.to_string()).collect(),
        machines: machines.into_iter().collect(),
        articles: articles.into_iter().collect(),
        article_names: article_names.into_iter().collect(),
        lot_ids: lot_ids.into_iter().collect(),
    }
}
