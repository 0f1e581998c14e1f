//! Contribution breakdown models.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The contribution owed for a single category.
///
/// Amounts are rounded once, per payer, to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryContribution {
    /// The contribution base after base policy and ceiling.
    pub base: Decimal,
    /// The employee's share.
    pub employee_amount: Decimal,
    /// The employer's share.
    pub employer_amount: Decimal,
}

/// Itemized contributions for one employee in one period.
///
/// Categories are keyed by their configured code so serialization order is
/// stable.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CategoryContribution, ContributionBreakdown};
/// use rust_decimal::Decimal;
///
/// let mut breakdown = ContributionBreakdown::default();
/// breakdown.insert("car", CategoryContribution {
///     base: Decimal::new(350000, 2),
///     employee_amount: Decimal::new(23975, 2),
///     employer_amount: Decimal::new(29155, 2),
/// });
/// assert_eq!(breakdown.employee_total, Decimal::new(23975, 2));
/// assert_eq!(breakdown.employer_total, Decimal::new(29155, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBreakdown {
    /// Per-category amounts.
    pub categories: BTreeMap<String, CategoryContribution>,
    /// Sum of all employee shares.
    pub employee_total: Decimal,
    /// Sum of all employer shares.
    pub employer_total: Decimal,
}

impl ContributionBreakdown {
    /// Adds a category and keeps the totals in step.
    ///
    /// Replacing an existing category subtracts its previous amounts first.
    pub fn insert(&mut self, code: impl Into<String>, contribution: CategoryContribution) {
        if let Some(previous) = self.categories.insert(code.into(), contribution) {
            self.employee_total -= previous.employee_amount;
            self.employer_total -= previous.employer_amount;
        }
        self.employee_total += contribution.employee_amount;
        self.employer_total += contribution.employer_amount;
    }

    /// Looks up a category by code.
    pub fn get(&self, code: &str) -> Option<&CategoryContribution> {
        self.categories.get(code)
    }

    /// Recomputes both totals from the per-category amounts.
    pub fn recompute_totals(&mut self) {
        self.employee_total = self.categories.values().map(|c| c.employee_amount).sum();
        self.employer_total = self.categories.values().map(|c| c.employer_amount).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn contribution(employee: &str, employer: &str) -> CategoryContribution {
        CategoryContribution {
            base: dec("1000"),
            employee_amount: dec(employee),
            employer_amount: dec(employer),
        }
    }

    #[test]
    fn test_totals_track_inserts() {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert("car", contribution("68.50", "83.30"));
        breakdown.insert("ccss", contribution("0", "134.00"));

        assert_eq!(breakdown.employee_total, dec("68.50"));
        assert_eq!(breakdown.employer_total, dec("217.30"));
    }

    #[test]
    fn test_replacing_a_category_does_not_double_count() {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert("car", contribution("68.50", "83.30"));
        breakdown.insert("car", contribution("34.25", "41.65"));

        assert_eq!(breakdown.categories.len(), 1);
        assert_eq!(breakdown.employee_total, dec("34.25"));
        assert_eq!(breakdown.employer_total, dec("41.65"));
    }

    #[test]
    fn test_recompute_totals_after_direct_edit() {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert("car", contribution("68.50", "83.30"));
        if let Some(car) = breakdown.categories.get_mut("car") {
            car.employee_amount = dec("10.00");
        }
        breakdown.recompute_totals();
        assert_eq!(breakdown.employee_total, dec("10.00"));
    }

    #[test]
    fn test_serializes_categories_in_code_order() {
        let mut breakdown = ContributionBreakdown::default();
        breakdown.insert("cmrc", contribution("1", "2"));
        breakdown.insert("car", contribution("3", "4"));
        let json = serde_json::to_string(&breakdown).unwrap();
        let car = json.find("\"car\"").unwrap();
        let cmrc = json.find("\"cmrc\"").unwrap();
        assert!(car < cmrc);
    }
}
