//! Response types for the HR engine API.
//!
//! This module defines the error response structures and the mapping from
//! [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};
use crate::store::StoreError;

/// Seconds a client should wait before retrying after a storage failure.
const RETRY_AFTER_SECS: &str = "5";

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// Creates a 401 response for a request without caller identity.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHENTICATED", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        if self.status == StatusCode::SERVICE_UNAVAILABLE {
            (
                self.status,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
                Json(self.error),
            )
                .into_response()
        } else {
            (self.status, Json(self.error)).into_response()
        }
    }
}

fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
            "CONFIG_ERROR"
        }
        EngineError::Validation { .. } => "VALIDATION_ERROR",
        EngineError::InvalidRange { .. } => "INVALID_RANGE",
        EngineError::MissingReason => "MISSING_REASON",
        EngineError::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
        EngineError::AlreadyCheckedOut { .. } => "ALREADY_CHECKED_OUT",
        EngineError::NoOpenCheckIn { .. } => "NO_OPEN_CHECK_IN",
        EngineError::NotPending { .. } => "NOT_PENDING",
        EngineError::NotApproved { .. } => "NOT_APPROVED",
        EngineError::AlreadyPaid { .. } => "ALREADY_PAID",
        EngineError::PayrollLocked { .. } => "PAYROLL_LOCKED",
        EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
        EngineError::InactiveEmployee { .. } => "INACTIVE_EMPLOYEE",
        EngineError::LeaveNotFound { .. } => "LEAVE_NOT_FOUND",
        EngineError::PayrollNotFound { .. } => "PAYROLL_NOT_FOUND",
        EngineError::Forbidden { .. } => "FORBIDDEN",
        EngineError::Export { .. } => "EXPORT_ERROR",
        EngineError::Storage(StoreError::Constraint { .. }) => "DUPLICATE_RECORD",
        EngineError::Storage(StoreError::Unavailable { .. }) => "STORAGE_UNAVAILABLE",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match error.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Storage => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Config | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = error_code(&error);

        let error = match &error {
            EngineError::Storage(StoreError::Unavailable { .. }) => ApiError::with_details(
                code,
                "The record store is temporarily unavailable",
                "No change was applied; retry the request",
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiError::with_details(code, "Configuration error", error.to_string())
            }
            EngineError::Validation { field, .. } => ApiError::with_details(
                code,
                error.to_string(),
                format!("Check the '{}' field", field),
            ),
            _ => ApiError::new(code, error.to_string()),
        };

        ApiErrorResponse { status, error }
    }
}
