//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

use super::types::{
    EdgeCasePolicy, JurisdictionsConfig, PayrollConfig, PayrollMetadata, PayrollSettings,
    PtoPolicy, RateTable, TaxRegime, Tier, ValidationPolicy,
};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them, and provides methods to query rate tables and
/// residence regimes. It is constructed once and passed by reference (or
/// behind an `Arc`) to every computation; there is no global instance.
///
/// # Directory Structure
///
/// ```text
/// config/monaco/
/// ├── payroll.yaml        # Metadata, PTO and edge-case policy
/// ├── jurisdictions.yaml  # Tax regime per residence country
/// └── rates/
///     └── 2025.yaml       # Contribution rates for one effective year
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/monaco").unwrap();
/// let table = loader.rate_table(2025).unwrap();
/// println!("{} categories", table.categories.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/monaco")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - A rate table or regime breaks its invariants (`InvalidConfiguration`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PayrollSettings>(&path.join("payroll.yaml"))?;
        let jurisdictions = Self::load_yaml::<JurisdictionsConfig>(&path.join("jurisdictions.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = PayrollConfig::new(settings, rates, jurisdictions.jurisdictions)?;

        tracing::info!(
            path = %path.display(),
            years = ?config.rate_tables().keys().collect::<Vec<_>>(),
            jurisdictions = config.jurisdictions().len(),
            "Loaded payroll configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already assembled configuration.
    ///
    /// Useful when rate tables are built in memory, e.g. to compare two
    /// configurations side by side in tests.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<RateTable>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the jurisdiction metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        &self.config.settings().metadata
    }

    /// Returns the PTO accrual policy.
    pub fn pto_policy(&self) -> &PtoPolicy {
        &self.config.settings().pto
    }

    /// Returns the edge-case agent policy.
    pub fn edge_case_policy(&self) -> &EdgeCasePolicy {
        &self.config.settings().edge_cases
    }

    /// Returns the payslip sanity-check thresholds.
    pub fn validation_policy(&self) -> &ValidationPolicy {
        &self.config.settings().validation
    }

    /// Gets the rate table for an effective year.
    ///
    /// There is no fallback to an earlier year: a missing table is a
    /// configuration error that must stop the whole batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/monaco")?;
    /// assert!(loader.rate_table(1999).is_err());
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn rate_table(&self, year: i32) -> EngineResult<Arc<RateTable>> {
        self.config
            .rate_tables()
            .get(&year)
            .cloned()
            .ok_or(EngineError::RateTableNotFound { year })
    }

    /// Resolves the tiers of one contribution category for a year.
    pub fn resolve(&self, category: &str, year: i32) -> EngineResult<&[Tier]> {
        let table = self
            .config
            .rate_tables()
            .get(&year)
            .ok_or(EngineError::RateTableNotFound { year })?;

        table
            .category(category)
            .map(|c| c.tiers.as_slice())
            .ok_or_else(|| EngineError::InvalidConfiguration {
                context: format!("rates/{}", year),
                message: format!("unknown contribution category '{}'", category),
            })
    }

    /// Gets the tax regime for a residence country.
    ///
    /// Country codes are matched case-insensitively. An unmapped country is
    /// an error for that employee; it never falls back to the domestic regime.
    pub fn jurisdiction(&self, country: &str) -> EngineResult<&TaxRegime> {
        let key = country.trim().to_uppercase();
        self.config
            .jurisdictions()
            .get(&key)
            .ok_or_else(|| EngineError::UnsupportedJurisdiction {
                country: country.to_string(),
            })
    }
}
