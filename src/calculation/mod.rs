//! Calculation logic for the payroll engine.
//!
//! This module contains the numeric pipeline for a payslip: tier splitting
//! and rounding, social contributions per category, the cross-border tax
//! adjustment, PTO accrual, payslip sanity checks, and the functions that
//! assemble them into a [`PayslipResult`](crate::models::PayslipResult).
//!
//! Nothing in here performs I/O; configuration is passed in by reference.

mod contribution;
mod cross_border;
mod payslip;
mod pto;
mod tiers;
mod validation;

pub use contribution::{BreakdownResult, CategoryResult, compute_breakdown, compute_category};
pub use cross_border::{TaxAdjustment, adjust};
pub use payslip::{ENGINE_VERSION, compute_draft, compute_payslip};
pub use pto::{PtoAccrualTracker, PtoTransition};
pub use tiers::{Band, TierAmounts, apply_brackets, apply_tiers, round_money, validate_bands};
pub use validation::validate_payslip;
