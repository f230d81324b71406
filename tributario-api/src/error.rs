//! # API Error Types
//!
//! Every handler failure becomes an [`AppError`], rendered as
//! `{ "error": { "code", "message" } }` with the matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tributario_core::CalculationError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST").
    pub code: String,
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unparseable request body (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Well-formed request with values the calculators reject (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable table set is loaded (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        match &self {
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => tracing::debug!(error = %self, "rejected request"),
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Table errors map to 503, parameter errors to 422.
impl From<CalculationError> for AppError {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::EmptyTable(_) | CalculationError::MissingTable(_) => {
                Self::ServiceUnavailable(err.to_string())
            }
            CalculationError::InvalidRate { .. } | CalculationError::InvalidThreshold(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn bad_request_status_code() {
        let err = AppError::BadRequest("empty body".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn validation_status_code() {
        let err = AppError::Validation("negative revenue".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn service_unavailable_status_code() {
        let err = AppError::ServiceUnavailable("no tables".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn missing_table_is_unavailable() {
        let err = AppError::from(CalculationError::MissingTable("irrf_table".to_string()));
        assert!(matches!(err, AppError::ServiceUnavailable(msg) if msg.contains("irrf_table")));
    }

    #[test]
    fn invalid_rate_is_a_validation_error() {
        let err = AppError::from(CalculationError::InvalidRate {
            name: "pis_rate",
            value: dec!(2),
        });
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("pis_rate")));
    }

    #[test]
    fn into_response_uses_status() {
        let response = AppError::BadRequest("empty body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
