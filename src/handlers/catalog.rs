// src/handlers/catalog.rs
use log::info;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::ViewMode;
use crate::services::dashboard::catalog_view;

pub async fn get_catalog(mode: String) -> Result<Json, Rejection> {
    info!("Handling request to get the {} catalog", mode);

    let mode: ViewMode = mode
        .parse()
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    Ok(warp::reply::json(&catalog_view(mode)))
}
