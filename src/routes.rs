// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::{InvalidQuery, Rejection};
use warp::{Filter, Reply};
use log::info;

use crate::handlers::catalog::get_catalog;
use crate::handlers::dashboard::{get_dashboard, get_dashboard_table_csv, DashboardQuery};
use crate::handlers::error::ApiError;
use crate::services::dashboard::Dashboard;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status, api_error.message.clone())
    } else if let Some(invalid) = err.find::<InvalidQuery>() {
        (StatusCode::BAD_REQUEST, invalid.to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    dashboard: Arc<Dashboard>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    info!("Configuring routes...");

    let dashboard_filter = warp::any().map(move || dashboard.clone());

    let catalog_route = warp::path!("api" / "v1" / "catalog" / String)
        .and(warp::get())
        .and_then(get_catalog);

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(warp::query::<DashboardQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_dashboard);

    let table_csv_route = warp::path!("api" / "v1" / "dashboard" / "table.csv")
        .and(warp::get())
        .and(warp::query::<DashboardQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_dashboard_table_csv);

    info!("All routes configured successfully.");

    catalog_route
        .or(dashboard_route)
        .or(table_csv_route)
        .recover(handle_rejection)
}
