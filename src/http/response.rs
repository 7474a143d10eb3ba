//! Error responses.
//!
//! # Responsibilities
//! - Map domain errors to HTTP status codes
//! - Render every failure as `{ "error": CODE, "message": text }`
//!
//! # Design Decisions
//! - NotFound → 404; InvalidInput and InsufficientCapacity → 400
//! - Codes are stable strings clients can branch on; messages are for humans

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::orders::OrderError;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// An error a handler returns to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            format!("Request body exceeds {limit} bytes"),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound(_) => Self::not_found(message),
            CatalogError::InvalidInput(_) => Self::bad_request(message),
            CatalogError::InsufficientCapacity { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_CAPACITY", message)
            }
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::Catalog(inner) => inner.into(),
            OrderError::Invalid { .. } => Self::bad_request(message),
            OrderError::NotFound(_) => Self::not_found(message),
        }
    }
}
