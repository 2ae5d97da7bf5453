// src/handlers/dashboard.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Json;
use warp::{Rejection, Reply};

use super::error::ApiError;
use crate::models::{AxisScale, ViewMode};
use crate::services::dashboard::{Dashboard, DashboardRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    pub mode: ViewMode,
    pub days: Option<u32>,
    pub relative: Option<bool>,
    pub auto_scale: Option<bool>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Comma separated catalog keys.
    pub instruments: Option<String>,
}

impl From<DashboardQuery> for DashboardRequest {
    fn from(q: DashboardQuery) -> Self {
        let (default_min, default_max) = AxisScale::DEFAULT_RANGE;
        let y_range = match (q.y_min, q.y_max) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(default_min), max.unwrap_or(default_max))),
        };
        let instruments = q.instruments.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        });

        DashboardRequest {
            mode: q.mode,
            days: q.days,
            relative: q.relative,
            auto_scale: q.auto_scale.unwrap_or(true),
            y_range,
            instruments,
        }
    }
}

pub async fn get_dashboard(
    query: DashboardQuery,
    dashboard: Arc<Dashboard>,
) -> Result<Json, Rejection> {
    info!("Handling dashboard request: {:?}", query);

    match dashboard.render(&query.into()).await {
        Ok(view) => {
            info!(
                "Rendered {} chart rows, {} table rows",
                view.chart.rows.len(),
                view.table.rows.len()
            );
            Ok(warp::reply::json(&view))
        }
        Err(e) => {
            error!("Failed to render dashboard: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

pub async fn get_dashboard_table_csv(
    query: DashboardQuery,
    dashboard: Arc<Dashboard>,
) -> Result<impl Reply, Rejection> {
    info!("Handling table export request: {:?}", query);

    let table = dashboard.table(&query.into()).await.map_err(|e| {
        error!("Failed to build table: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let body = table.to_csv().map_err(|e| {
        error!("Failed to encode table as CSV: {}", e);
        warp::reject::custom(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        ))
    })?;

    Ok(warp::reply::with_header(
        body,
        "content-type",
        "text/csv; charset=utf-8",
    ))
}
