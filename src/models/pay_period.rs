//! Pay period model.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A monthly pay period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
///
/// let period = PayPeriod::new(2025, 3);
/// assert!(period.is_valid());
/// assert_eq!(period.label(), "03-2025");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The calendar year; selects the rate table.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
}

impl PayPeriod {
    /// Creates a pay period.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Returns true if the month is within 1..=12.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }

    /// Calendar days in the month, or `None` for an invalid period.
    pub fn days_in_month(&self) -> Option<u32> {
        if !self.is_valid() {
            return None;
        }
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        next.pred_opt().map(|last| last.day())
    }

    /// The `MM-YYYY` label used in reasons and logs.
    pub fn label(&self) -> String {
        format!("{:02}-{}", self.month, self.year)
    }
}
