//! Payslip result models.
//!
//! This module contains the [`PayslipResult`] type and its associated
//! structures: the cross-border tax detail, the edge-case modification log,
//! and the audit trace recording every calculation decision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContributionBreakdown, EdgeCaseCategory, OverdrawWarning, PayPeriod, PtoState};

/// The withholding regime applied for the employee's residence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegimeKind {
    /// Resident of the employing jurisdiction: no further tax.
    #[default]
    Domestic,
    /// Flat levies plus a progressive bracketed withholding.
    Progressive,
    /// A single flat-rate withholding.
    Flat,
}

/// Cross-border tax applied on top of social contributions.
///
/// # Example
///
/// ```
/// use payroll_engine::models::TaxWithholding;
/// use rust_decimal::Decimal;
///
/// let tax = TaxWithholding::domestic(Decimal::new(320000, 2));
/// assert_eq!(tax.total, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxWithholding {
    /// The regime selected from the residence country.
    pub regime: TaxRegimeKind,
    /// Residence country code the regime was resolved from.
    pub residence_country: String,
    /// Gross salary minus employee contributions.
    pub taxable_base: Decimal,
    /// Sum of flat levies (regime A only).
    pub flat_levies: Decimal,
    /// Bracketed or flat-rate withholding.
    pub withholding: Decimal,
    /// `flat_levies + withholding`.
    pub total: Decimal,
}

impl TaxWithholding {
    /// A domestic result with nothing withheld.
    pub fn domestic(taxable_base: Decimal) -> Self {
        Self {
            regime: TaxRegimeKind::Domestic,
            residence_country: String::new(),
            taxable_base,
            flat_levies: Decimal::ZERO,
            withholding: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// A field changed by an automatic edge-case correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCaseModification {
    /// The payslip field that changed (e.g. "gross_salary", "contribution.car.employee").
    pub field: String,
    /// Value before the correction.
    pub old_value: Decimal,
    /// Value after the correction.
    pub new_value: Decimal,
    /// Why the correction was made.
    pub reason: String,
    /// Classifier confidence behind the correction.
    pub confidence: Decimal,
    /// True when applied without human review.
    pub automatic: bool,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete audit trace for a payslip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Appends a step, numbering it after the existing ones.
    pub fn push(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

/// The complete result of a payslip computation.
///
/// This is the sole output artifact of the engine. A draft is a
/// `PayslipResult` whose edge-case fields are still at their defaults; the
/// edge-case agent turns it into the final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The employee the payslip is for.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// Gross salary for the period.
    pub gross_salary: Decimal,
    /// Itemized social contributions.
    pub contribution_breakdown: ContributionBreakdown,
    /// Cross-border tax detail.
    pub tax: TaxWithholding,
    /// Net salary after contributions and withholding.
    pub net_salary: Decimal,
    /// Gross salary plus employer contributions.
    pub employer_total_cost: Decimal,
    /// Leave balances after this period.
    pub pto_state: PtoState,
    /// Recoverable leave overdraw warnings.
    #[serde(default)]
    pub warnings: Vec<OverdrawWarning>,
    /// Sanity-check findings for the reviewer; never fatal.
    #[serde(default)]
    pub validation_issues: Vec<String>,
    /// True when an edge case was detected.
    pub edge_case_flag: bool,
    /// The detected edge-case category.
    pub edge_case_category: EdgeCaseCategory,
    /// Classifier confidence in the category (0 to 1).
    pub edge_case_confidence: Decimal,
    /// Why the edge case was flagged or corrected.
    pub edge_case_reason: Option<String>,
    /// The remark text attached for a human reviewer.
    pub edge_case_remark: Option<String>,
    /// True when a human must review this payslip before sign-off.
    pub requires_manual_review: bool,
    /// Fields changed by automatic corrections.
    #[serde(default)]
    pub modifications: Vec<EdgeCaseModification>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl PayslipResult {
    /// Recomputes net salary and employer cost from gross, contributions and tax.
    pub fn recompute_totals(&mut self) {
        self.contribution_breakdown.recompute_totals();
        self.net_salary =
            self.gross_salary - self.contribution_breakdown.employee_total - self.tax.total;
        self.employer_total_cost = self.gross_salary + self.contribution_breakdown.employer_total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryContribution;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_payslip() -> PayslipResult {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert(
            "car",
            CategoryContribution {
                base: dec("3500"),
                employee_amount: dec("239.75"),
                employer_amount: dec("291.55"),
            },
        );
        PayslipResult {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            employee_id: "S000000001".to_string(),
            period: PayPeriod::new(2025, 3),
            gross_salary: dec("3500.00"),
            contribution_breakdown: breakdown,
            tax: TaxWithholding::domestic(dec("3260.25")),
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
    fn test_recompute_totals() {
        let mut payslip = sample_payslip();
        payslip.recompute_totals();
        assert_eq!(payslip.net_salary, dec("3260.25"));
        assert_eq!(payslip.employer_total_cost, dec("3791.55"));
    }

    #[test]
    fn test_recompute_totals_subtracts_tax() {
        let mut payslip = sample_payslip();
        payslip.tax.withholding = dec("100.00");
        payslip.tax.total = dec("100.00");
        payslip.recompute_totals();
        assert_eq!(payslip.net_salary, dec("3160.25"));
    }

    #[test]
    fn test_audit_trace_numbers_steps_sequentially() {
        let mut trace = AuditTrace::default();
        trace.push(
            "contribution",
            "Contribution",
            serde_json::json!({}),
            serde_json::json!({}),
            "first".to_string(),
        );
        trace.push(
            "tax",
            "Tax",
            serde_json::json!({}),
            serde_json::json!({}),
            "second".to_string(),
        );
        assert_eq!(trace.steps[0].step_number, 1);
        assert_eq!(trace.steps[1].step_number, 2);
    }

    #[test]
    fn test_payslip_serialization_uses_snake_case_category() {
        let payslip = sample_payslip();
        let json = serde_json::to_string(&payslip).unwrap();
        assert!(json.contains("\"edge_case_category\":\"none\""));
        assert!(json.contains("\"regime\":\"domestic\""));

        let back: PayslipResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gross_salary, payslip.gross_salary);
        assert_eq!(back.employee_id, "S000000001");
    }
}
