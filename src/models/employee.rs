//! Employee input model and related types.
//!
//! An [`EmployeeInput`] is the normalized per-period record the engine
//! consumes. It is created by the caller from whatever data source holds the
//! payroll variables and stays immutable for the duration of a computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the employment arrangement that drives contribution base policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentClass {
    /// Standard salaried employment.
    Standard,
    /// Household staff (gens de maison), eligible for a reduced base on some categories.
    Household,
    /// Part-time employment.
    PartTime,
}

/// Which leave bucket days taken in the period are drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PtoDraw {
    /// Drain the prior-year (N-1) balance before touching the current year.
    #[default]
    PriorYearFirst,
    /// Charge everything against the current year (N).
    CurrentYearOnly,
}

/// Accrued and taken days for a single leave year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtoBucket {
    /// Days accrued so far in this leave year.
    #[serde(default)]
    pub accrued: Decimal,
    /// Days taken so far in this leave year.
    #[serde(default)]
    pub taken: Decimal,
}

impl PtoBucket {
    /// Creates a bucket from accrued and taken days.
    pub fn new(accrued: Decimal, taken: Decimal) -> Self {
        Self { accrued, taken }
    }
}

/// Leave balances carried in from the previous period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorPtoBalance {
    /// The previous leave year (N-1).
    #[serde(default)]
    pub year_n_minus_1: PtoBucket,
    /// The current leave year (N).
    #[serde(default)]
    pub year_n: PtoBucket,
}

/// The normalized input record for one employee in one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInput {
    /// Unique identifier for the employee (matricule).
    pub employee_id: String,
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// The employment arrangement.
    pub employment_class: EmploymentClass,
    /// ISO country code of the employee's residence (e.g. "MC", "FR", "IT").
    pub residence_country: String,
    /// Hours worked in the period.
    #[serde(default)]
    pub hours_worked: Decimal,
    /// Free-text operator remark; may be empty.
    #[serde(default)]
    pub remark_text: String,
    /// Leave balances before this period closes.
    #[serde(default)]
    pub prior_pto_balance: PriorPtoBalance,
    /// Leave days taken during this period.
    #[serde(default)]
    pub pto_days_taken: Decimal,
    /// Bucket order for days taken.
    #[serde(default)]
    pub pto_draw: PtoDraw,
    /// Personalised withholding rate communicated by the residence tax authority.
    #[serde(default)]
    pub withholding_rate: Option<Decimal>,
    /// Gross salary of the previous period, used as numeric evidence by the edge-case agent.
    #[serde(default)]
    pub previous_gross_salary: Option<Decimal>,
    /// Working days in the period, overriding the configured default for prorations.
    #[serde(default)]
    pub days_in_period: Option<Decimal>,
}

impl EmployeeInput {
    /// Creates an input with empty remark, zero leave balances and default options.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{EmployeeInput, EmploymentClass};
    /// use rust_decimal::Decimal;
    ///
    /// let input = EmployeeInput::new("S000000001", Decimal::new(3500, 0), EmploymentClass::Standard, "MC");
    /// assert!(input.remark_text.is_empty());
    /// assert!(!input.is_household());
    /// ```
    pub fn new(
        employee_id: impl Into<String>,
        gross_salary: Decimal,
        employment_class: EmploymentClass,
        residence_country: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            gross_salary,
            employment_class,
            residence_country: residence_country.into(),
            hours_worked: Decimal::from(169),
            remark_text: String::new(),
            prior_pto_balance: PriorPtoBalance::default(),
            pto_days_taken: Decimal::ZERO,
            pto_draw: PtoDraw::default(),
            withholding_rate: None,
            previous_gross_salary: None,
            days_in_period: None,
        }
    }

    /// Returns true if the employee is household staff.
    pub fn is_household(&self) -> bool {
        self.employment_class == EmploymentClass::Household
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_minimal_employee() {
        let json = r#"{
            "employee_id": "S000000001",
            "gross_salary": "3500.00",
            "employment_class": "standard",
            "residence_country": "MC"
        }"#;

        let input: EmployeeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.employee_id, "S000000001");
        assert_eq!(input.gross_salary, dec("3500.00"));
        assert_eq!(input.employment_class, EmploymentClass::Standard);
        assert!(input.remark_text.is_empty());
        assert_eq!(input.pto_draw, PtoDraw::PriorYearFirst);
        assert_eq!(input.prior_pto_balance, PriorPtoBalance::default());
        assert!(input.withholding_rate.is_none());
    }

    #[test]
    fn test_deserialize_household_with_leave() {
        let json = r#"{
            "employee_id": "S000000002",
            "gross_salary": "2500",
            "employment_class": "household",
            "residence_country": "FR",
            "hours_worked": "120",
            "remark_text": "prime exceptionnelle",
            "prior_pto_balance": {
                "year_n_minus_1": {"accrued": "30", "taken": "12"},
                "year_n": {"accrued": "5", "taken": "0"}
            },
            "pto_days_taken": "3",
            "pto_draw": "current_year_only",
            "withholding_rate": "0.075"
        }"#;

        let input: EmployeeInput = serde_json::from_str(json).unwrap();
        assert!(input.is_household());
        assert_eq!(input.hours_worked, dec("120"));
        assert_eq!(input.prior_pto_balance.year_n_minus_1.taken, dec("12"));
        assert_eq!(input.pto_days_taken, dec("3"));
        assert_eq!(input.pto_draw, PtoDraw::CurrentYearOnly);
        assert_eq!(input.withholding_rate, Some(dec("0.075")));
    }

    #[test]
    fn test_employment_class_serialization() {
        assert_eq!(
            serde_json::to_string(&EmploymentClass::PartTime).unwrap(),
            "\"part_time\""
        );
        assert_eq!(
            serde_json::to_string(&EmploymentClass::Household).unwrap(),
            "\"household\""
        );
    }

    #[test]
    fn test_missing_gross_salary_is_rejected() {
        let json = r#"{
            "employee_id": "S000000003",
            "employment_class": "standard",
            "residence_country": "MC"
        }"#;
        let result: Result<EmployeeInput, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
