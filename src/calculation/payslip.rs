//! Payslip assembly.
//!
//! [`compute_draft`] runs the numeric pipeline for one employee:
//! contributions, cross-border tax, then PTO. [`compute_payslip`] adds the
//! remark classification, the edge-case agent and the sanity checks to
//! produce the final result.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::edge_case::{EdgeCaseAgent, EdgeCaseEvidence, RemarkClassifier};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, EdgeCaseCategory, EmployeeInput, PayPeriod, PayslipResult};

use super::contribution::compute_breakdown;
use super::cross_border::adjust;
use super::pto::PtoAccrualTracker;
use super::validation::validate_payslip;

/// The engine version recorded on every result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn invalid(employee: &EmployeeInput, field: &str, message: String) -> EngineError {
    EngineError::InvalidInput {
        employee_id: employee.employee_id.clone(),
        field: field.to_string(),
        message,
    }
}

/// Rejects inputs no computation can make sense of.
fn validate_input(employee: &EmployeeInput, period: PayPeriod) -> EngineResult<()> {
    if employee.employee_id.trim().is_empty() {
        return Err(invalid(employee, "employee_id", "must not be empty".to_string()));
    }
    if !period.is_valid() {
        return Err(invalid(
            employee,
            "period.month",
            format!("must be 1-12, got {}", period.month),
        ));
    }
    if employee.gross_salary <= Decimal::ZERO {
        return Err(invalid(
            employee,
            "gross_salary",
            format!("must be positive, got {}", employee.gross_salary),
        ));
    }
    if employee.hours_worked < Decimal::ZERO {
        return Err(invalid(
            employee,
            "hours_worked",
            format!("must not be negative, got {}", employee.hours_worked),
        ));
    }

    let balance = &employee.prior_pto_balance;
    for (field, value) in [
        ("prior_pto_balance.year_n_minus_1.accrued", balance.year_n_minus_1.accrued),
        ("prior_pto_balance.year_n_minus_1.taken", balance.year_n_minus_1.taken),
        ("prior_pto_balance.year_n.accrued", balance.year_n.accrued),
        ("prior_pto_balance.year_n.taken", balance.year_n.taken),
        ("pto_days_taken", employee.pto_days_taken),
    ] {
        if value < Decimal::ZERO {
            return Err(invalid(
                employee,
                field,
                format!("must not be negative, got {}", value),
            ));
        }
    }

    if let Some(rate) = employee.withholding_rate {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(invalid(
                employee,
                "withholding_rate",
                format!("must be between 0 and 1, got {}", rate),
            ));
        }
    }
    if let Some(days) = employee.days_in_period {
        if days <= Decimal::ZERO {
            return Err(invalid(
                employee,
                "days_in_period",
                format!("must be positive, got {}", days),
            ));
        }
    }

    Ok(())
}

/// Computes the draft payslip: contributions, tax and PTO, without any
/// edge-case handling.
///
/// # Errors
///
/// - `InvalidInput` for a non-positive gross, an invalid month, or negative
///   leave figures
/// - `RateTableNotFound` when no table exists for `period.year`
/// - `UnsupportedJurisdiction` for an unmapped residence country
pub fn compute_draft(
    employee: &EmployeeInput,
    period: PayPeriod,
    config: &ConfigLoader,
) -> EngineResult<PayslipResult> {
    validate_input(employee, period)?;

    let table = config.rate_table(period.year)?;
    let regime = config.jurisdiction(&employee.residence_country)?;

    let mut audit_trace = AuditTrace::default();

    let contributions = compute_breakdown(employee, &table, 1)?;
    audit_trace.steps.extend(contributions.audit_steps);

    let tax = adjust(
        &contributions.breakdown,
        employee.gross_salary,
        &employee.residence_country,
        regime,
        employee.withholding_rate,
        audit_trace.steps.len() as u32 + 1,
    );
    audit_trace.steps.push(tax.audit_step);

    let pto = PtoAccrualTracker::new(config.pto_policy()).close_period(
        period,
        &employee.prior_pto_balance,
        employee.pto_days_taken,
        employee.pto_draw,
        audit_trace.steps.len() as u32 + 1,
    );
    audit_trace.steps.push(pto.audit_step);

    if !pto.warnings.is_empty() {
        tracing::warn!(
            employee_id = %employee.employee_id,
            warnings = pto.warnings.len(),
            "Leave overdraw clamped"
        );
    }

    let mut payslip = PayslipResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        employee_id: employee.employee_id.clone(),
        period,
        gross_salary: employee.gross_salary,
        contribution_breakdown: contributions.breakdown,
        tax: tax.tax,
        net_salary: tax.net_salary,
        employer_total_cost: Decimal::ZERO,
        pto_state: pto.state,
        warnings: pto.warnings,
        validation_issues: Vec::new(),
        edge_case_flag: false,
        edge_case_category: EdgeCaseCategory::None,
        edge_case_confidence: Decimal::ZERO,
        edge_case_reason: None,
        edge_case_remark: None,
        requires_manual_review: false,
        modifications: Vec::new(),
        audit_trace,
    };
    payslip.recompute_totals();

    Ok(payslip)
}

/// Computes the final payslip for one employee.
///
/// Runs [`compute_draft`], classifies the remark, lets the edge-case agent
/// resolve it, then attaches the sanity-check findings.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::compute_payslip;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeInput, EmploymentClass, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/monaco")?;
/// let employee = EmployeeInput::new("S001", Decimal::from(3500), EmploymentClass::Standard, "MC");
/// let payslip = compute_payslip(&employee, PayPeriod::new(2025, 3), &config)?;
/// assert!(!payslip.edge_case_flag);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn compute_payslip(
    employee: &EmployeeInput,
    period: PayPeriod,
    config: &ConfigLoader,
) -> EngineResult<PayslipResult> {
    let start = Instant::now();

    let draft = compute_draft(employee, period, config)?;
    let classification = RemarkClassifier::classify(&employee.remark_text);
    let agent = EdgeCaseAgent::new(config.edge_case_policy().clone());
    let mut payslip = agent.resolve(
        draft,
        &classification,
        &EdgeCaseEvidence::from_input(employee),
    );

    payslip.validation_issues = validate_payslip(&payslip, config.validation_policy());
    payslip.audit_trace.duration_us = start.elapsed().as_micros() as u64;

    tracing::debug!(
        employee_id = %payslip.employee_id,
        period = %period.label(),
        net_salary = %payslip.net_salary,
        edge_case_flag = payslip.edge_case_flag,
        duration_us = payslip.audit_trace.duration_us,
        "Computed payslip"
    );

    Ok(payslip)
}
