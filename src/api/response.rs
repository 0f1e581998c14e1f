//! Response types for the payroll engine API.
//!
//! This module defines the batch response body, the error response
//! structures, and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{BatchOutcome, EmployeeFailure};
use crate::error::EngineError;
use crate::models::{PayPeriod, PayslipResult};

/// Response body for the `/payslips` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipBatchResponse {
    /// Identifier of the request, also present in the server logs.
    pub correlation_id: Uuid,
    /// Period label ("MM-YYYY").
    pub period: String,
    /// One payslip per successfully computed employee.
    pub results: Vec<PayslipResult>,
    /// Employees that could not be computed.
    pub failures: Vec<EmployeeFailure>,
    /// True if the batch stopped before every employee was computed.
    pub cancelled: bool,
}

impl PayslipBatchResponse {
    /// Wraps a batch outcome for the wire.
    pub fn new(correlation_id: Uuid, period: PayPeriod, outcome: BatchOutcome) -> Self {
        Self {
            correlation_id,
            period: period.label(),
            results: outcome.results,
            failures: outcome.failures,
            cancelled: outcome.cancelled,
        }
    }
}

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
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error.code();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfiguration { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(code, "Configuration error", error.to_string()),
            },
            EngineError::RateTableNotFound { year } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    code,
                    error.to_string(),
                    format!("Add config/rates/{}.yaml to compute this period", year),
                ),
            },
            EngineError::InvalidInput { .. } | EngineError::UnsupportedJurisdiction { .. } => {
                ApiErrorResponse::bad_request(ApiError::new(code, error.to_string()))
            }
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(code, "Calculation failed", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_rate_table_not_found_is_bad_request() {
        let response: ApiErrorResponse = EngineError::RateTableNotFound { year: 2019 }.into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "RATE_TABLE_NOT_FOUND");
        assert!(response.error.details.unwrap().contains("2019.yaml"));
    }

    #[test]
    fn test_config_errors_are_server_errors() {
        let response: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "/etc/payroll".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "CONFIG_NOT_FOUND");
    }

    #[test]
    fn test_batch_response_uses_period_label() {
        let response = PayslipBatchResponse::new(
            Uuid::new_v4(),
            PayPeriod::new(2025, 3),
            BatchOutcome::default(),
        );
        assert_eq!(response.period, "03-2025");
        assert!(response.results.is_empty());
    }
}
