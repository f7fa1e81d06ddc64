//! API Response types and error mapping
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response carrying HTTP status and machine error name
//! - `ApiResult<T>`: Handler return type

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::AccountError;
use crate::transfer::TransferError;
use crate::validation::{FieldViolation, Violations};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, otherwise the HTTP status of the error
/// - msg: short message description
/// - data: payload on success, [`ErrorDetail`] on error
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// Error payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error name
    #[schema(value_type = String, example = "INSUFFICIENT_BALANCE")]
    pub error: &'static str,
    /// Offending fields, for validation errors only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub msg: String,
    pub detail: ErrorDetail,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with the payload
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with the created resource
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
            detail: ErrorDetail {
                error,
                violations: Vec::new(),
            },
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", msg)
    }

    pub fn validation(violations: &Violations) -> Self {
        let mut err = Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            violations.to_string(),
        );
        err.detail.violations = violations.iter().cloned().collect();
        err
    }

    fn from_domain(
        status: u16,
        error: &'static str,
        msg: String,
        violations: Option<&Violations>,
    ) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            // storage details stay in the log
            tracing::error!(error, "{}", msg);
            return Self::new(status, error, "Internal server error");
        }
        let mut err = Self::new(status, error, msg);
        if let Some(v) = violations {
            err.detail.violations = v.iter().cloned().collect();
        }
        err
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        Self::from_domain(e.http_status(), e.code(), e.to_string(), e.violations())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        Self::from_domain(e.http_status(), e.code(), e.to_string(), e.violations())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.status.as_u16() as i32,
            msg: self.msg,
            data: Some(self.detail),
        };
        (self.status, Json(body)).into_response()
    }
}
