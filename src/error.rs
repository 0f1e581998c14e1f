//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payslips.
//!
//! Errors fall into two classes. Configuration errors (missing files, bad
//! YAML, invalid rate tables, no rate table for the requested year) are fatal
//! for a whole batch. Everything else fails a single employee and the batch
//! continues.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::RateTableNotFound { year: 2019 };
/// assert_eq!(error.to_string(), "No rate table configured for year 2019");
/// assert!(error.is_fatal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration was parsed but violates a rate table or policy invariant.
    #[error("Invalid configuration in '{context}': {message}")]
    InvalidConfiguration {
        /// Where the violation was found (file, category code, ...).
        context: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// No rate table exists for the requested effective year.
    #[error("No rate table configured for year {year}")]
    RateTableNotFound {
        /// The requested effective year.
        year: i32,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid input for employee '{employee_id}', field '{field}': {message}")]
    InvalidInput {
        /// The employee whose record was rejected.
        employee_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The employee's residence country has no configured tax regime.
    #[error("Unsupported residence jurisdiction: {country}")]
    UnsupportedJurisdiction {
        /// The residence country code as supplied.
        country: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns true for configuration-class errors, which abort a whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::InvalidConfiguration { .. }
                | EngineError::RateTableNotFound { .. }
        )
    }

    /// A stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            EngineError::RateTableNotFound { .. } => "RATE_TABLE_NOT_FOUND",
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::UnsupportedJurisdiction { .. } => "UNSUPPORTED_JURISDICTION",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
