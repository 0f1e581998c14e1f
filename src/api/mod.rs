//! HTTP API module for the payroll engine.
//!
//! This module provides the REST API endpoints for computing payslip
//! batches and classifying operator remarks.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ClassifyRequest, PayslipBatchRequest};
pub use response::{ApiError, ApiErrorResponse, PayslipBatchResponse};
pub use state::AppState;
