//! Request types for the payroll engine API.
//!
//! This module defines the JSON request structures for the `/payslips` and
//! `/remarks/classify` endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{EmployeeInput, PayPeriod};

/// Request body for the `/payslips` endpoint.
///
/// One batch: every employee of a company for a single pay period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipBatchRequest {
    /// The pay period to compute.
    pub period: PayPeriod,
    /// Normalized inputs, one per employee.
    pub employees: Vec<EmployeeInput>,
}

impl PayslipBatchRequest {
    /// Checks request-level constraints that serde cannot express.
    ///
    /// Per-employee field checks happen later, inside the batch, so that one
    /// bad record does not reject the others.
    pub fn validate(&self) -> Result<(), String> {
        if !self.period.is_valid() {
            return Err(format!(
                "period.month must be between 1 and 12, got {}",
                self.period.month
            ));
        }
        if self.employees.is_empty() {
            return Err("employees must contain at least one record".to_string());
        }
        Ok(())
    }
}

/// Request body for the `/remarks/classify` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// The free-text remark to classify.
    pub remark: String,
}
