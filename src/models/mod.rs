//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod contribution;
mod edge_case;
mod employee;
mod pay_period;
mod payslip;
mod pto;

pub use contribution::{CategoryContribution, ContributionBreakdown};
pub use edge_case::EdgeCaseCategory;
pub use employee::{EmployeeInput, EmploymentClass, PriorPtoBalance, PtoBucket, PtoDraw};
pub use pay_period::PayPeriod;
pub use payslip::{
    AuditStep, AuditTrace, EdgeCaseModification, PayslipResult, TaxRegimeKind, TaxWithholding,
};
pub use pto::{LeaveYear, OverdrawWarning, PtoState};
