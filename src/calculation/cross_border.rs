//! Cross-border tax adjustment.
//!
//! Employees resident outside the employing jurisdiction may owe tax to
//! their country of residence, withheld at source. The regime is selected
//! purely from the residence country.

use rust_decimal::Decimal;

use crate::config::TaxRegime;
use crate::models::{AuditStep, ContributionBreakdown, TaxRegimeKind, TaxWithholding};

use super::tiers::{apply_brackets, round_money};

/// The result of a cross-border adjustment.
#[derive(Debug, Clone)]
pub struct TaxAdjustment {
    /// The withholding detail.
    pub tax: TaxWithholding,
    /// Gross minus employee contributions minus withholding.
    pub net_salary: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Adjusts net salary for the employee's residence.
///
/// The taxable base is gross salary minus employee contributions. Then:
///
/// - `Domestic`: nothing further is withheld.
/// - `Progressive`: each flat levy is charged on `base x base_fraction`,
///   plus the bracket schedule on the taxable base. A personal
///   `withholding_rate` replaces the bracket schedule when present.
/// - `Flat`: a single rate on the taxable base.
///
/// Each levy and the withholding are rounded once, half to even.
///
/// # Arguments
///
/// * `breakdown` - The employee's contribution breakdown
/// * `gross_salary` - Gross salary for the period
/// * `residence_country` - Country code the regime was resolved for
/// * `regime` - The regime for that country
/// * `withholding_rate` - Optional personalised rate for the progressive regime
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::adjust;
/// use payroll_engine::config::TaxRegime;
/// use payroll_engine::models::{CategoryContribution, ContributionBreakdown};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// let mut breakdown = ContributionBreakdown::default();
/// breakdown.insert("car", CategoryContribution {
///     base: d("3000"), employee_amount: d("205.50"), employer_amount: d("249.90"),
/// });
///
/// let regime = TaxRegime::Flat { rate: d("0.15") };
/// let result = adjust(&breakdown, d("3000"), "IT", &regime, None, 1);
/// // (3000 - 205.50) x 0.15 = 419.175
/// assert_eq!(result.tax.withholding, d("419.18"));
/// assert_eq!(result.net_salary, d("2375.32"));
/// ```
pub fn adjust(
    breakdown: &ContributionBreakdown,
    gross_salary: Decimal,
    residence_country: &str,
    regime: &TaxRegime,
    withholding_rate: Option<Decimal>,
    step_number: u32,
) -> TaxAdjustment {
    let taxable_base = (gross_salary - breakdown.employee_total).max(Decimal::ZERO);

    let (kind, levies, withholding, reasoning) = match regime {
        TaxRegime::Domestic => (
            TaxRegimeKind::Domestic,
            Vec::new(),
            Decimal::ZERO,
            format!(
                "Resident of {}: no withholding beyond social contributions",
                residence_country
            ),
        ),
        TaxRegime::Progressive {
            flat_levies,
            brackets,
        } => {
            let levies: Vec<(String, Decimal)> = flat_levies
                .iter()
                .map(|levy| {
                    let amount = round_money(taxable_base * levy.base_fraction * levy.rate);
                    (levy.code.clone(), amount)
                })
                .collect();

            let (withholding, source) = match withholding_rate {
                Some(rate) => (
                    round_money(taxable_base * rate),
                    format!("personal rate {}", rate.normalize()),
                ),
                None => (
                    round_money(apply_brackets(taxable_base, brackets)),
                    format!("{} bracket(s)", brackets.len()),
                ),
            };

            (
                TaxRegimeKind::Progressive,
                levies,
                withholding,
                format!(
                    "Resident of {}: flat levies plus withholding on {} using {}",
                    residence_country, taxable_base, source
                ),
            )
        }
        TaxRegime::Flat { rate } => (
            TaxRegimeKind::Flat,
            Vec::new(),
            round_money(taxable_base * rate),
            format!(
                "Resident of {}: flat {} on {}",
                residence_country,
                rate.normalize(),
                taxable_base
            ),
        ),
    };

    let flat_levies: Decimal = levies.iter().map(|(_, amount)| *amount).sum();
    let total = flat_levies + withholding;
    let tax = TaxWithholding {
        regime: kind,
        residence_country: residence_country.to_string(),
        taxable_base,
        flat_levies,
        withholding,
        total,
    };
    let net_salary = gross_salary - breakdown.employee_total - total;

    let audit_step = AuditStep {
        step_number,
        rule_id: "cross_border_tax".to_string(),
        rule_name: "Cross-Border Tax Adjustment".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "employee_contributions": breakdown.employee_total.to_string(),
            "residence_country": residence_country,
            "withholding_rate": withholding_rate.map(|r| r.to_string()),
        }),
        output: serde_json::json!({
            "regime": kind,
            "taxable_base": taxable_base.to_string(),
            "levies": levies
                .iter()
                .map(|(code, amount)| serde_json::json!({ "code": code, "amount": amount.to_string() }))
                .collect::<Vec<_>>(),
            "withholding": withholding.to_string(),
            "net_salary": net_salary.to_string(),
        }),
        reasoning,
    };

    TaxAdjustment {
        tax,
        net_salary,
        audit_step,
    }
}
