//! Configuration loading and management for the payroll engine.
//!
//! This module loads payroll configuration from YAML files: jurisdiction
//! metadata, PTO and edge-case policy, residence tax regimes, and one
//! contribution rate table per effective year.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/monaco").unwrap();
//! println!("Loaded payroll config: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BasePolicy, ContributionCategory, EdgeCasePolicy, FlatLevy, JurisdictionsConfig,
    PayrollConfig, PayrollMetadata, PayrollSettings, PtoPolicy, RateTable, TaxBracket, TaxRegime,
    Tier, ValidationPolicy,
};
