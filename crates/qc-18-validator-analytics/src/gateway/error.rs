//! Gateway errors and their HTTP mapping.
//!
//! Every failure is answered as `{"message": ..., "code": <status>}`.
//! Internal failures get a generic message; the detail stays in the logs.

use crate::error::{AnalyticsError, StateFetchError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("state_id is required in URL params")]
    MissingStateId,

    #[error("No data submitted")]
    EmptyBody,

    #[error("Could not decode request body: {0}")]
    Decode(String),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// A handler panicked; already logged by the recovery wrapper
    #[error("Internal server error")]
    Panic,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingStateId | GatewayError::EmptyBody | GatewayError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Panic => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Analytics(err) => match err {
                AnalyticsError::StateFetch(fetch) => match fetch {
                    StateFetchError::MissingStateId
                    | StateFetchError::InvalidStateId { .. }
                    | StateFetchError::FutureSlot { .. } => StatusCode::BAD_REQUEST,
                    StateFetchError::NotFound { .. } => StatusCode::NOT_FOUND,
                    StateFetchError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                },
                AnalyticsError::EpochOutOfRange { .. } => StatusCode::BAD_REQUEST,
                AnalyticsError::LockTimeout { .. } | AnalyticsError::Cancelled => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                AnalyticsError::UnsupportedForVersion { .. }
                | AnalyticsError::ForkDataMismatch { .. }
                | AnalyticsError::BalanceOverflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message returned to the caller
    pub fn message(&self) -> String {
        match self {
            GatewayError::Analytics(err) => match err {
                AnalyticsError::StateFetch(StateFetchError::MissingStateId) => {
                    GatewayError::MissingStateId.to_string()
                }
                AnalyticsError::StateFetch(fetch) => format!("Could not get state: {}", fetch),
                AnalyticsError::EpochOutOfRange { .. } => err.to_string(),
                AnalyticsError::LockTimeout { .. } => {
                    "Beacon state is busy, try again later".to_string()
                }
                AnalyticsError::Cancelled => "Request cancelled".to_string(),
                _ => INTERNAL_MESSAGE.to_string(),
            },
            other => other.to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message(),
            code: self.status().as_u16(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !matches!(self, GatewayError::Panic) {
            error!("[qc-18] Request failed: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
