//! Social contribution calculation.
//!
//! Each category in a [`RateTable`] is computed independently: derive the
//! base from gross salary and the category's base policy, cap it at the
//! effective ceiling, split it over the tiers, then round the employee and
//! employer sums once each.

use rust_decimal::Decimal;

use crate::config::{BasePolicy, ContributionCategory, RateTable};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CategoryContribution, ContributionBreakdown, EmployeeInput};

use super::tiers::{apply_tiers, round_money};

/// The result of computing one contribution category.
#[derive(Debug, Clone)]
pub struct CategoryResult {
    /// The category code.
    pub code: String,
    /// Base and rounded employee/employer amounts.
    pub contribution: CategoryContribution,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of computing every category of a rate table.
#[derive(Debug, Clone)]
pub struct BreakdownResult {
    /// Contributions keyed by category code, with totals.
    pub breakdown: ContributionBreakdown,
    /// One audit step per category, in table order.
    pub audit_steps: Vec<AuditStep>,
}

/// Returns the contribution base before any ceiling, and whether a reduced
/// base policy applied.
fn contribution_base(employee: &EmployeeInput, category: &ContributionCategory) -> (Decimal, bool) {
    match &category.base_policy {
        BasePolicy::FullGross => (employee.gross_salary, false),
        BasePolicy::ReducedFraction {
            fraction,
            employment_classes,
            max_monthly_hours,
        } => {
            let class_applies = employment_classes.contains(&employee.employment_class);
            let hours_apply = max_monthly_hours.is_none_or(|max| employee.hours_worked < max);
            if class_applies && hours_apply {
                (employee.gross_salary * fraction, true)
            } else {
                (employee.gross_salary, false)
            }
        }
    }
}

/// Computes the employee and employer amounts for one category.
///
/// # Arguments
///
/// * `employee` - The employee input; gross, class and hours drive the base
/// * `category` - The contribution category from the year's rate table
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a `CategoryResult`, or `InvalidInput` if gross salary is not
/// positive.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_category;
/// use payroll_engine::config::{BasePolicy, ContributionCategory, Tier};
/// use payroll_engine::models::{EmployeeInput, EmploymentClass};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// let car = ContributionCategory {
///     code: "car".to_string(),
///     description: "Pension".to_string(),
///     tiers: vec![Tier { lower_bound: d("0"), upper_bound: None, employee_rate: d("0.0685"), employer_rate: d("0.0833") }],
///     monthly_ceiling: Some(d("6112")),
///     annual_ceiling: None,
///     base_policy: BasePolicy::FullGross,
/// };
/// let employee = EmployeeInput::new("S001", d("8000"), EmploymentClass::Standard, "MC");
///
/// let result = compute_category(&employee, &car, 1).unwrap();
/// assert_eq!(result.contribution.base, d("6112"));
/// assert_eq!(result.contribution.employee_amount, d("418.67"));
/// ```
pub fn compute_category(
    employee: &EmployeeInput,
    category: &ContributionCategory,
    step_number: u32,
) -> EngineResult<CategoryResult> {
    if employee.gross_salary <= Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            employee_id: employee.employee_id.clone(),
            field: "gross_salary".to_string(),
            message: format!("must be positive, got {}", employee.gross_salary),
        });
    }

    let (raw_base, reduced) = contribution_base(employee, category);
    let ceiling = category.effective_ceiling();
    let base = match ceiling {
        Some(cap) => raw_base.min(cap),
        None => raw_base,
    };

    let amounts = apply_tiers(base, &category.tiers);
    let contribution = CategoryContribution {
        base: round_money(base),
        employee_amount: round_money(amounts.employee),
        employer_amount: round_money(amounts.employer),
    };

    let capped = ceiling.is_some_and(|cap| raw_base > cap);
    let mut reasoning = format!(
        "Base {} over {} tier(s): employee {}, employer {}",
        contribution.base,
        category.tiers.len(),
        contribution.employee_amount,
        contribution.employer_amount
    );
    if reduced {
        reasoning.push_str(" (reduced base for employment class)");
    }
    if capped {
        reasoning.push_str(" (capped at ceiling)");
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: format!("contribution_{}", category.code),
        rule_name: category.description.clone(),
        input: serde_json::json!({
            "gross_salary": employee.gross_salary.to_string(),
            "employment_class": employee.employment_class,
            "hours_worked": employee.hours_worked.to_string(),
            "ceiling": ceiling.map(|c| c.normalize().to_string()),
        }),
        output: serde_json::json!({
            "base": contribution.base.to_string(),
            "reduced_base": reduced,
            "capped": capped,
            "employee_amount": contribution.employee_amount.to_string(),
            "employer_amount": contribution.employer_amount.to_string(),
        }),
        reasoning,
    };

    Ok(CategoryResult {
        code: category.code.clone(),
        contribution,
        audit_step,
    })
}

/// Computes every category of a rate table for one employee.
///
/// Audit steps are numbered consecutively from `first_step`.
pub fn compute_breakdown(
    employee: &EmployeeInput,
    table: &RateTable,
    first_step: u32,
) -> EngineResult<BreakdownResult> {
    let mut breakdown = ContributionBreakdown::default();
    let mut audit_steps = Vec::with_capacity(table.categories.len());

    for (offset, category) in table.categories.iter().enumerate() {
        let result = compute_category(employee, category, first_step + offset as u32)?;
        breakdown.insert(&result.code, result.contribution);
        audit_steps.push(result.audit_step);
    }

    tracing::debug!(
        employee_id = %employee.employee_id,
        year = table.effective_year,
        employee_total = %breakdown.employee_total,
        employer_total = %breakdown.employer_total,
        "Computed contribution breakdown"
    );

    Ok(BreakdownResult {
        breakdown,
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tier;
    use crate::models::EmploymentClass;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn flat_category(code: &str, employee: &str, employer: &str) -> ContributionCategory {
        ContributionCategory {
            code: code.to_string(),
            description: code.to_uppercase(),
            tiers: vec![Tier {
                lower_bound: dec("0"),
                upper_bound: None,
                employee_rate: dec(employee),
                employer_rate: dec(employer),
            }],
            monthly_ceiling: None,
            annual_ceiling: None,
            base_policy: BasePolicy::FullGross,
        }
    }

    fn cmrc() -> ContributionCategory {
        ContributionCategory {
            code: "cmrc".to_string(),
            description: "Retraite complémentaire".to_string(),
            tiers: vec![
                Tier {
                    lower_bound: dec("0"),
                    upper_bound: Some(dec("3971")),
                    employee_rate: dec("0.0401"),
                    employer_rate: dec("0.0601"),
                },
                Tier {
                    lower_bound: dec("3971"),
                    upper_bound: None,
                    employee_rate: dec("0.0972"),
                    employer_rate: dec("0.1457"),
                },
            ],
            monthly_ceiling: None,
            annual_ceiling: None,
            base_policy: BasePolicy::FullGross,
        }
    }

    fn ccss() -> ContributionCategory {
        let mut category = flat_category("ccss", "0", "0.134");
        category.monthly_ceiling = Some(dec("9800"));
        category.base_policy = BasePolicy::ReducedFraction {
            fraction: dec("0.33"),
            employment_classes: vec![EmploymentClass::Household],
            max_monthly_hours: Some(dec("254")),
        };
        category
    }

    fn employee(gross: &str) -> EmployeeInput {
        EmployeeInput::new("S000000001", dec(gross), EmploymentClass::Standard, "MC")
    }

    #[test]
    fn test_two_tier_split_rounds_once_per_category() {
        let result = compute_category(&employee("5000"), &cmrc(), 1).unwrap();
        assert_eq!(result.contribution.employee_amount, dec("259.26"));
        assert_eq!(result.contribution.employer_amount, dec("388.58"));
        assert_eq!(result.contribution.base, dec("5000"));
    }

    #[test]
    fn test_single_tier_below_threshold() {
        let result = compute_category(&employee("3500"), &cmrc(), 1).unwrap();
        // 3500 x 0.0401 = 140.35
        assert_eq!(result.contribution.employee_amount, dec("140.35"));
        // 3500 x 0.0601 = 210.35
        assert_eq!(result.contribution.employer_amount, dec("210.35"));
    }

    #[test]
    fn test_monthly_ceiling_caps_base() {
        let mut car = flat_category("car", "0.0685", "0.0833");
        car.monthly_ceiling = Some(dec("6112"));

        let at_ceiling = compute_category(&employee("6112"), &car, 1).unwrap();
        let above = compute_category(&employee("9000"), &car, 1).unwrap();

        assert_eq!(above.contribution, at_ceiling.contribution);
        assert_eq!(above.contribution.employee_amount, dec("418.67"));
        assert_eq!(above.audit_step.output["capped"], true);
        assert_eq!(at_ceiling.audit_step.output["capped"], false);
    }

    #[test]
    fn test_annual_ceiling_applies_monthly_twelfth() {
        let mut unemployment = flat_category("unemployment", "0.024", "0.0405");
        unemployment.annual_ceiling = Some(dec("188400"));

        let result = compute_category(&employee("20000"), &unemployment, 1).unwrap();
        assert_eq!(result.contribution.base, dec("15700"));
        // 15700 x 0.024 = 376.80
        assert_eq!(result.contribution.employee_amount, dec("376.80"));
    }

    #[test]
    fn test_household_reduced_base() {
        let mut household = employee("2000");
        household.employment_class = EmploymentClass::Household;
        household.hours_worked = dec("120");

        let result = compute_category(&household, &ccss(), 1).unwrap();
        assert_eq!(result.contribution.base, dec("660"));
        // 660 x 0.134 = 88.44
        assert_eq!(result.contribution.employer_amount, dec("88.44"));
        assert_eq!(result.audit_step.output["reduced_base"], true);
    }

    #[test]
    fn test_household_at_hours_threshold_uses_full_gross() {
        let mut household = employee("2000");
        household.employment_class = EmploymentClass::Household;
        household.hours_worked = dec("254");

        let result = compute_category(&household, &ccss(), 1).unwrap();
        assert_eq!(result.contribution.base, dec("2000"));
    }

    #[test]
    fn test_standard_class_ignores_reduced_policy() {
        let result = compute_category(&employee("2000"), &ccss(), 1).unwrap();
        assert_eq!(result.contribution.base, dec("2000"));
        assert_eq!(result.contribution.employer_amount, dec("268.00"));
    }

    #[test]
    fn test_non_positive_gross_is_invalid_input() {
        for gross in ["0", "-100"] {
            let err = compute_category(&employee(gross), &cmrc(), 1).unwrap_err();
            match err {
                EngineError::InvalidInput { field, .. } => assert_eq!(field, "gross_salary"),
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_breakdown_totals_and_step_numbers() {
        let table = RateTable {
            effective_year: 2025,
            source: None,
            categories: vec![flat_category("car", "0.0685", "0.0833"), cmrc()],
        };

        let result = compute_breakdown(&employee("3500"), &table, 3).unwrap();
        // car: 239.75 / 291.55, cmrc: 140.35 / 210.35
        assert_eq!(result.breakdown.employee_total, dec("380.10"));
        assert_eq!(result.breakdown.employer_total, dec("501.90"));
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[0].step_number, 3);
        assert_eq!(result.audit_steps[1].step_number, 4);
        assert_eq!(result.audit_steps[1].rule_id, "contribution_cmrc");
    }
}
