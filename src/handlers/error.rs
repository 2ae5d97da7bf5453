// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::error::DashboardError;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match err {
            DashboardError::NoSelection | DashboardError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::DataSource { .. } => StatusCode::BAD_GATEWAY,
            DashboardError::EmptyColumn { .. }
            | DashboardError::UnusableBaseline { .. }
            | DashboardError::UnknownInstrument(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, format!("An error occurred: {}", err))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
