//! Contribution and edge-case computation engine for Monaco payroll.
//!
//! This crate computes one payslip per employee per month: social
//! contributions per category (tiered rates, ceilings, reduced bases),
//! cross-border tax for residents of neighbouring countries, paid-leave
//! accrual, and an automated review of operator remarks that either
//! corrects the payslip or flags it for a human.
//!
//! Batches of employees are computed in parallel against a shared,
//! read-only [`config::ConfigLoader`].

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod edge_case;
pub mod error;
pub mod models;
