//! Paid-time-off accrual tracking.
//!
//! Every closed period accrues the monthly rate into the current leave year
//! (N). Days taken are charged to the prior leave year (N-1) first. At the
//! start of a new leave year the current bucket's remaining days become the
//! prior-year bucket and the current bucket resets to zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PtoPolicy;
use crate::models::{
    AuditStep, LeaveYear, OverdrawWarning, PayPeriod, PriorPtoBalance, PtoBucket, PtoDraw,
    PtoState,
};

fn round_days(days: Decimal) -> Decimal {
    days.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// The result of closing a period for one employee.
#[derive(Debug, Clone)]
pub struct PtoTransition {
    /// Balances after the period.
    pub state: PtoState,
    /// Overdraw warnings raised while clamping.
    pub warnings: Vec<OverdrawWarning>,
    /// True when the leave-year rollover happened in this period.
    pub rolled_over: bool,
    /// The audit step recording this transition.
    pub audit_step: AuditStep,
}

/// Tracks PTO balances across period closes.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::PtoAccrualTracker;
/// use payroll_engine::config::PtoPolicy;
/// use payroll_engine::models::{PayPeriod, PriorPtoBalance, PtoBucket, PtoDraw};
/// use rust_decimal::Decimal;
///
/// let policy = PtoPolicy {
///     monthly_accrual_days: Decimal::new(25, 1),
///     leave_year_start_month: 5,
/// };
/// let tracker = PtoAccrualTracker::new(&policy);
/// let prior = PriorPtoBalance {
///     year_n_minus_1: PtoBucket::new(Decimal::from(30), Decimal::from(10)),
///     year_n: PtoBucket::new(Decimal::from(5), Decimal::ZERO),
/// };
///
/// let transition = tracker.close_period(PayPeriod::new(2025, 3), &prior, Decimal::from(3), PtoDraw::PriorYearFirst, 1);
/// assert_eq!(transition.state.taken_n1, Decimal::from(13));
/// assert_eq!(transition.state.accrued_n, Decimal::new(75, 1));
/// assert!(transition.warnings.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PtoAccrualTracker {
    monthly_accrual_days: Decimal,
    leave_year_start_month: u32,
}

impl PtoAccrualTracker {
    /// Creates a tracker for the given policy.
    pub fn new(policy: &PtoPolicy) -> Self {
        Self {
            monthly_accrual_days: policy.monthly_accrual_days,
            leave_year_start_month: policy.leave_year_start_month,
        }
    }

    /// Rolls the leave year over.
    ///
    /// The prior-year bucket becomes `{accrued: remaining_n, taken: 0}` and
    /// the current bucket resets to zero. Unused prior-year days are dropped.
    pub fn rollover(balance: &PriorPtoBalance) -> PriorPtoBalance {
        let remaining_n = (balance.year_n.accrued - balance.year_n.taken).max(Decimal::ZERO);
        PriorPtoBalance {
            year_n_minus_1: PtoBucket::new(remaining_n, Decimal::ZERO),
            year_n: PtoBucket::default(),
        }
    }

    /// Closes one period.
    ///
    /// Order of operations: clamp inconsistent carried-in balances, roll
    /// over if `period` opens a new leave year, accrue the monthly rate,
    /// then charge `days_taken` according to `draw`. Whenever `taken` would
    /// exceed `accrued` it is clamped and an [`OverdrawWarning`] is attached;
    /// this never fails.
    pub fn close_period(
        &self,
        period: PayPeriod,
        prior: &PriorPtoBalance,
        days_taken: Decimal,
        draw: PtoDraw,
        step_number: u32,
    ) -> PtoTransition {
        let mut warnings = Vec::new();

        let mut n1 = clamp_bucket(prior.year_n_minus_1, LeaveYear::PriorYear, &mut warnings);
        let mut n = clamp_bucket(prior.year_n, LeaveYear::CurrentYear, &mut warnings);

        let rolled_over = period.month == self.leave_year_start_month;
        if rolled_over {
            let rolled = Self::rollover(&PriorPtoBalance {
                year_n_minus_1: n1,
                year_n: n,
            });
            n1 = rolled.year_n_minus_1;
            n = rolled.year_n;
        }

        n.accrued += self.monthly_accrual_days;

        let mut outstanding = days_taken.max(Decimal::ZERO);
        if draw == PtoDraw::PriorYearFirst {
            let available = n1.accrued - n1.taken;
            let from_prior = outstanding.min(available);
            n1.taken += from_prior;
            outstanding -= from_prior;
        }

        let available_n = n.accrued - n.taken;
        if outstanding > available_n {
            let excess = outstanding - available_n;
            warnings.push(OverdrawWarning {
                bucket: LeaveYear::CurrentYear,
                requested_taken: n.taken + outstanding,
                clamped_taken: n.accrued,
                excess_days: excess,
                message: format!(
                    "{} day(s) of leave taken in {} exceed the available balance and were not charged",
                    excess,
                    period.label()
                ),
            });
            n.taken = n.accrued;
        } else {
            n.taken += outstanding;
        }

        let state = PtoState::from_buckets(
            round_days(n1.accrued),
            round_days(n1.taken),
            round_days(n.accrued),
            round_days(n.taken),
        );

        let audit_step = AuditStep {
            step_number,
            rule_id: "pto_accrual".to_string(),
            rule_name: "PTO Accrual".to_string(),
            input: serde_json::json!({
                "period": period.label(),
                "prior_n1": { "accrued": prior.year_n_minus_1.accrued.to_string(), "taken": prior.year_n_minus_1.taken.to_string() },
                "prior_n": { "accrued": prior.year_n.accrued.to_string(), "taken": prior.year_n.taken.to_string() },
                "days_taken": days_taken.to_string(),
                "draw": draw,
            }),
            output: serde_json::json!({
                "rolled_over": rolled_over,
                "remaining_n1": state.remaining_n1.to_string(),
                "remaining_n": state.remaining_n.to_string(),
                "warnings": warnings.len(),
            }),
            reasoning: format!(
                "Accrued {} day(s){}; remaining N-1 {}, N {}",
                self.monthly_accrual_days.normalize(),
                if rolled_over {
                    " after leave-year rollover"
                } else {
                    ""
                },
                state.remaining_n1,
                state.remaining_n
            ),
        };

        PtoTransition {
            state,
            warnings,
            rolled_over,
            audit_step,
        }
    }
}

/// Clamps a carried-in bucket whose `taken` already exceeds `accrued`.
fn clamp_bucket(
    bucket: PtoBucket,
    which: LeaveYear,
    warnings: &mut Vec<OverdrawWarning>,
) -> PtoBucket {
    if bucket.taken <= bucket.accrued {
        return bucket;
    }
    let excess = bucket.taken - bucket.accrued;
    warnings.push(OverdrawWarning {
        bucket: which,
        requested_taken: bucket.taken,
        clamped_taken: bucket.accrued,
        excess_days: excess,
        message: format!(
            "Carried-in balance shows {} day(s) taken against {} accrued",
            bucket.taken, bucket.accrued
        ),
    });
    PtoBucket::new(bucket.accrued, bucket.accrued)
}
