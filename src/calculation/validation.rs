//! Payslip sanity checks.
//!
//! These checks flag figures a payroll officer should look at twice. They
//! never fail the employee; findings are attached to the result.

use rust_decimal::Decimal;

use crate::config::ValidationPolicy;
use crate::models::PayslipResult;

/// Returns the list of sanity-check findings for a computed payslip.
///
/// Checks, in order:
/// - gross salary below the configured minimum monthly wage
/// - gross salary above the high-salary threshold
/// - employee contribution ratio outside the configured band
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::{compute_payslip, validate_payslip};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeInput, EmploymentClass, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/monaco")?;
/// let employee = EmployeeInput::new("S001", Decimal::from(1500), EmploymentClass::Standard, "MC");
/// let payslip = compute_payslip(&employee, PayPeriod::new(2025, 3), &config)?;
/// assert!(!validate_payslip(&payslip, config.validation_policy()).is_empty());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn validate_payslip(payslip: &PayslipResult, policy: &ValidationPolicy) -> Vec<String> {
    let mut issues = Vec::new();
    let gross = payslip.gross_salary;

    if gross < policy.minimum_monthly_wage {
        issues.push(format!(
            "Gross salary {} is below the minimum monthly wage {}",
            gross, policy.minimum_monthly_wage
        ));
    }

    if gross > policy.high_salary_threshold {
        issues.push(format!(
            "Gross salary {} exceeds {}; please verify",
            gross, policy.high_salary_threshold
        ));
    }

    if gross > Decimal::ZERO {
        let ratio = payslip.contribution_breakdown.employee_total / gross;
        if ratio < policy.min_employee_contribution_ratio
            || ratio > policy.max_employee_contribution_ratio
        {
            issues.push(format!(
                "Employee contribution ratio {}% is outside the expected {}%-{}% band",
                (ratio * Decimal::ONE_HUNDRED).round_dp(2),
                (policy.min_employee_contribution_ratio * Decimal::ONE_HUNDRED).normalize(),
                (policy.max_employee_contribution_ratio * Decimal::ONE_HUNDRED).normalize()
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuditTrace, CategoryContribution, ContributionBreakdown, EdgeCaseCategory, PayPeriod,
        PtoState, TaxWithholding,
    };
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn policy() -> ValidationPolicy {
        ValidationPolicy {
            minimum_monthly_wage: dec("2007.72"),
            high_salary_threshold: dec("100000"),
            min_employee_contribution_ratio: dec("0.10"),
            max_employee_contribution_ratio: dec("0.50"),
        }
    }

    fn payslip(gross: &str, employee_total: &str) -> PayslipResult {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert(
            "car",
            CategoryContribution {
                base: dec(gross),
                employee_amount: dec(employee_total),
                employer_amount: Decimal::ZERO,
            },
        );
        PayslipResult {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "test".to_string(),
            employee_id: "S000000001".to_string(),
            period: PayPeriod::new(2025, 3),
            gross_salary: dec(gross),
            contribution_breakdown: breakdown,
            tax: TaxWithholding::domestic(Decimal::ZERO),
            net_salary: Decimal::ZERO,
            employer_total_cost: Decimal::ZERO,
            pto_state: PtoState::default(),
            warnings: vec![],
            validation_issues: vec![],
            edge_case_flag: false,
            edge_case_category: EdgeCaseCategory::None,
            edge_case_confidence: Decimal::ZERO,
            edge_case_reason: None,
            edge_case_remark: None,
            requires_manual_review: false,
            modifications: vec![],
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_typical_payslip_has_no_issues() {
        assert!(validate_payslip(&payslip("3500", "464.10"), &policy()).is_empty());
    }

    #[test]
    fn test_below_minimum_wage() {
        let issues = validate_payslip(&payslip("1500", "200"), &policy());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("minimum monthly wage"));
    }

    #[test]
    fn test_above_high_salary_threshold() {
        let issues = validate_payslip(&payslip("150000", "20000"), &policy());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("please verify"));
    }

    #[test]
    fn test_contribution_ratio_out_of_band() {
        let low = validate_payslip(&payslip("3500", "100"), &policy());
        assert_eq!(low.len(), 1);
        assert!(low[0].contains("ratio"));

        let high = validate_payslip(&payslip("3500", "2000"), &policy());
        assert_eq!(high.len(), 1);
        assert!(high[0].contains("57.14%"));
    }
}
