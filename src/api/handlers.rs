//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{CancellationFlag, run_batch};
use crate::edge_case::RemarkClassifier;

use super::request::{ClassifyRequest, PayslipBatchRequest};
use super::response::{ApiError, ApiErrorResponse, PayslipBatchResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payslips", post(payslips_handler))
        .route("/remarks/classify", post(classify_handler))
        .with_state(state)
}

/// Raises the batch cancellation flag when the request future is dropped,
/// which is what happens when the client disconnects mid-batch.
struct CancelOnDrop(CancellationFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a JSON extractor rejection to an API error body.
fn rejection_to_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // Holds the detailed serde message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /payslips.
///
/// Computes every employee of the batch and returns results and per-employee
/// failures together. Only batch-level errors (bad period, missing rate
/// table, configuration) produce an error status.
async fn payslips_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipBatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payslip batch request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = rejection_to_error(correlation_id, rejection);
            return error_response(ApiErrorResponse::bad_request(error));
        }
    };

    if let Err(message) = request.validate() {
        warn!(correlation_id = %correlation_id, error = %message, "Request validation failed");
        return error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
            message,
        )));
    }

    let period = request.period;
    let employees = request.employees.len();
    let guard = CancelOnDrop(CancellationFlag::new());
    let start_time = Instant::now();

    match run_batch(state.shared_config(), period, request.employees, guard.0.clone()).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                period = %period.label(),
                employees,
                results = outcome.results.len(),
                failures = outcome.failures.len(),
                duration_us = start_time.elapsed().as_micros() as u64,
                "Payslip batch completed"
            );
            json_response(
                StatusCode::OK,
                PayslipBatchResponse::new(correlation_id, period, outcome),
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payslip batch failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /remarks/classify.
///
/// Classifies a single remark without computing a payslip; used by operators
/// to check how a remark will be read before submitting a batch.
async fn classify_handler(payload: Result<Json<ClassifyRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = rejection_to_error(correlation_id, rejection);
            return error_response(ApiErrorResponse::bad_request(error));
        }
    };

    let classification = RemarkClassifier::classify(&request.remark);
    info!(
        correlation_id = %correlation_id,
        category = classification.category.as_str(),
        confidence = %classification.confidence,
        "Remark classified"
    );
    json_response(StatusCode::OK, classification)
}
