//! Paid-time-off state and overdraw warnings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two leave-year buckets tracked for every employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveYear {
    /// The previous leave year (N-1).
    PriorYear,
    /// The current leave year (N).
    CurrentYear,
}

/// Leave balances after a period close, in days with two decimal places.
///
/// `remaining_*` always equals `accrued_* - taken_*` and is never negative.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PtoState;
/// use rust_decimal::Decimal;
///
/// let state = PtoState::from_buckets(
///     Decimal::new(30, 0), Decimal::new(12, 0),
///     Decimal::new(25, 1), Decimal::ZERO,
/// );
/// assert_eq!(state.remaining_n1, Decimal::new(18, 0));
/// assert_eq!(state.remaining_n, Decimal::new(25, 1));
/// assert!(state.is_consistent());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtoState {
    /// Days accrued in the previous leave year.
    pub accrued_n1: Decimal,
    /// Days taken against the previous leave year.
    pub taken_n1: Decimal,
    /// Days remaining in the previous leave year.
    pub remaining_n1: Decimal,
    /// Days accrued in the current leave year.
    pub accrued_n: Decimal,
    /// Days taken against the current leave year.
    pub taken_n: Decimal,
    /// Days remaining in the current leave year.
    pub remaining_n: Decimal,
}

impl PtoState {
    /// Builds a state from accrued/taken pairs, deriving the remaining balances.
    pub fn from_buckets(
        accrued_n1: Decimal,
        taken_n1: Decimal,
        accrued_n: Decimal,
        taken_n: Decimal,
    ) -> Self {
        Self {
            accrued_n1,
            taken_n1,
            remaining_n1: accrued_n1 - taken_n1,
            accrued_n,
            taken_n,
            remaining_n: accrued_n - taken_n,
        }
    }

    /// Returns true when both buckets satisfy `remaining = accrued - taken >= 0`.
    pub fn is_consistent(&self) -> bool {
        self.remaining_n1 == self.accrued_n1 - self.taken_n1
            && self.remaining_n == self.accrued_n - self.taken_n
            && self.remaining_n1 >= Decimal::ZERO
            && self.remaining_n >= Decimal::ZERO
    }
}

/// Recoverable warning raised when leave taken would exceed leave accrued.
///
/// The tracker clamps `taken` to `accrued` and attaches this warning to the
/// payslip for human follow-up instead of failing the employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdrawWarning {
    /// The bucket that was overdrawn.
    pub bucket: LeaveYear,
    /// Days the input asked to record as taken.
    pub requested_taken: Decimal,
    /// Days actually recorded after clamping.
    pub clamped_taken: Decimal,
    /// Days that could not be charged to any bucket.
    pub excess_days: Decimal,
    /// Human-readable description for the reviewer.
    pub message: String,
}
