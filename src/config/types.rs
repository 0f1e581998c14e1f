//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, together with the
//! load-time validation that guards the rate table invariants.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{Band, validate_bands};
use crate::error::{EngineError, EngineResult};
use crate::models::EmploymentClass;

/// Metadata about the payroll jurisdiction.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollMetadata {
    /// Short code for the configuration set (e.g., "MC").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// ISO code of the employing country; residents pay no further tax.
    pub domestic_country: String,
    /// Currency of all monetary amounts.
    pub currency: String,
}

/// Paid-time-off accrual policy.
#[derive(Debug, Clone, Deserialize)]
pub struct PtoPolicy {
    /// Days accrued per closed period.
    pub monthly_accrual_days: Decimal,
    /// Month (1-12) at which the leave year rolls over.
    pub leave_year_start_month: u32,
}

/// Thresholds and defaults used by the edge-case agent.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeCasePolicy {
    /// Minimum confidence for an automatic correction.
    pub auto_correct_threshold: Decimal,
    /// Minimum confidence for a manual-review flag.
    pub review_threshold: Decimal,
    /// Working days assumed in a period when the input does not say.
    pub working_days_per_period: Decimal,
    /// Relative month-over-month gross change that needs an explanation.
    pub anomaly_threshold: Decimal,
}

impl Default for EdgeCasePolicy {
    fn default() -> Self {
        Self {
            auto_correct_threshold: Decimal::new(85, 2),
            review_threshold: Decimal::new(5, 1),
            working_days_per_period: Decimal::from(22),
            anomaly_threshold: Decimal::new(15, 2),
        }
    }
}

/// Sanity-check thresholds applied to every computed payslip.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationPolicy {
    /// Legal minimum monthly wage.
    pub minimum_monthly_wage: Decimal,
    /// Gross above which a payslip is flagged for verification.
    pub high_salary_threshold: Decimal,
    /// Lowest plausible employee contribution ratio.
    pub min_employee_contribution_ratio: Decimal,
    /// Highest plausible employee contribution ratio.
    pub max_employee_contribution_ratio: Decimal,
}

/// Root of `payroll.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSettings {
    /// Jurisdiction metadata.
    pub metadata: PayrollMetadata,
    /// Leave accrual policy.
    pub pto: PtoPolicy,
    /// Edge-case agent policy.
    #[serde(default)]
    pub edge_cases: EdgeCasePolicy,
    /// Payslip sanity checks.
    pub validation: ValidationPolicy,
}

/// A contribution rate band.
///
/// The taxable portion of a base `B` is `max(0, min(upper, B) - lower)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Tier {
    /// Inclusive lower bound.
    pub lower_bound: Decimal,
    /// Exclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate paid by the employee, as a fraction.
    pub employee_rate: Decimal,
    /// Rate paid by the employer, as a fraction.
    pub employer_rate: Decimal,
}

impl Band for Tier {
    fn lower_bound(&self) -> Decimal {
        self.lower_bound
    }

    fn upper_bound(&self) -> Option<Decimal> {
        self.upper_bound
    }

    fn rates(&self) -> Vec<Decimal> {
        vec![self.employee_rate, self.employer_rate]
    }
}

/// How the contribution base is derived from gross salary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BasePolicy {
    /// The base is the full gross salary.
    #[default]
    FullGross,
    /// The base is a fixed fraction of gross for the listed classes.
    ReducedFraction {
        /// Fraction of gross used as the base, in (0, 1].
        fraction: Decimal,
        /// Employment classes the reduction applies to.
        employment_classes: Vec<EmploymentClass>,
        /// The reduction only applies strictly below this many hours per month.
        #[serde(default)]
        max_monthly_hours: Option<Decimal>,
    },
}

/// One social-contribution category with its tiers and ceilings.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionCategory {
    /// Stable code used as the breakdown key (e.g., "cmrc").
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Rate tiers, ascending and contiguous.
    pub tiers: Vec<Tier>,
    /// Monthly cap on the base.
    #[serde(default)]
    pub monthly_ceiling: Option<Decimal>,
    /// Annual cap on the base; applied as one twelfth per month.
    #[serde(default)]
    pub annual_ceiling: Option<Decimal>,
    /// Base derivation rule.
    #[serde(default)]
    pub base_policy: BasePolicy,
}

impl ContributionCategory {
    /// The effective monthly cap, or `None` if the category is uncapped.
    ///
    /// With both ceilings configured the lower of `monthly_ceiling` and
    /// `annual_ceiling / 12` applies.
    pub fn effective_ceiling(&self) -> Option<Decimal> {
        let annual_monthly = self.annual_ceiling.map(|annual| annual / Decimal::from(12));
        match (self.monthly_ceiling, annual_monthly) {
            (Some(monthly), Some(annual)) => Some(monthly.min(annual)),
            (Some(monthly), None) => Some(monthly),
            (None, Some(annual)) => Some(annual),
            (None, None) => None,
        }
    }

    fn validate(&self, year: i32) -> EngineResult<()> {
        let context = format!("rates/{} category '{}'", year, self.code);

        validate_bands(&self.tiers, &context)?;

        for (name, ceiling) in [
            ("monthly_ceiling", self.monthly_ceiling),
            ("annual_ceiling", self.annual_ceiling),
        ] {
            if let Some(value) = ceiling.filter(|value| *value <= Decimal::ZERO) {
                return Err(EngineError::InvalidConfiguration {
                    context,
                    message: format!("{} must be positive, got {}", name, value),
                });
            }
        }

        if let BasePolicy::ReducedFraction { fraction, .. } = &self.base_policy {
            if *fraction <= Decimal::ZERO || *fraction > Decimal::ONE {
                return Err(EngineError::InvalidConfiguration {
                    context,
                    message: format!("base fraction must be in (0, 1], got {}", fraction),
                });
            }
        }

        Ok(())
    }
}

/// Contribution rates for one effective year.
///
/// Immutable once loaded; shared read-only across concurrent computations.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// The year these rates apply to.
    pub effective_year: i32,
    /// Where the rates were published.
    #[serde(default)]
    pub source: Option<String>,
    /// Categories in computation order.
    pub categories: Vec<ContributionCategory>,
}

impl RateTable {
    /// Checks every category's tiers, ceilings and base policy.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{ContributionCategory, RateTable, Tier, BasePolicy};
    /// use rust_decimal::Decimal;
    ///
    /// let table = RateTable {
    ///     effective_year: 2025,
    ///     source: None,
    ///     categories: vec![ContributionCategory {
    ///         code: "car".to_string(),
    ///         description: "Pension".to_string(),
    ///         tiers: vec![Tier {
    ///             lower_bound: Decimal::ZERO,
    ///             upper_bound: None,
    ///             employee_rate: Decimal::new(685, 4),
    ///             employer_rate: Decimal::new(833, 4),
    ///         }],
    ///         monthly_ceiling: Some(Decimal::from(6112)),
    ///         annual_ceiling: None,
    ///         base_policy: BasePolicy::FullGross,
    ///     }],
    /// };
    /// assert!(table.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.code.as_str()) {
                return Err(EngineError::InvalidConfiguration {
                    context: format!("rates/{}", self.effective_year),
                    message: format!("duplicate category code '{}'", category.code),
                });
            }
            category.validate(self.effective_year)?;
        }
        Ok(())
    }

    /// Looks up a category by code.
    pub fn category(&self, code: &str) -> Option<&ContributionCategory> {
        self.categories.iter().find(|c| c.code == code)
    }
}

/// A flat levy charged on the taxable base under the progressive regime.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatLevy {
    /// Levy code (e.g., "csg_crds").
    pub code: String,
    /// Rate as a fraction.
    pub rate: Decimal,
    /// Share of the taxable base the levy applies to.
    #[serde(default = "default_base_fraction")]
    pub base_fraction: Decimal,
}

fn default_base_fraction() -> Decimal {
    Decimal::ONE
}

/// One bracket of a progressive withholding schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the monthly taxable base.
    pub lower_bound: Decimal,
    /// Exclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate as a fraction.
    pub rate: Decimal,
}

impl Band for TaxBracket {
    fn lower_bound(&self) -> Decimal {
        self.lower_bound
    }

    fn upper_bound(&self) -> Option<Decimal> {
        self.upper_bound
    }

    fn rates(&self) -> Vec<Decimal> {
        vec![self.rate]
    }
}

/// Tax treatment selected by residence country.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum TaxRegime {
    /// No tax beyond social contributions.
    Domestic,
    /// Flat levies plus a progressive bracketed withholding.
    Progressive {
        /// Levies charged on (a fraction of) the taxable base.
        #[serde(default)]
        flat_levies: Vec<FlatLevy>,
        /// The monthly withholding schedule.
        brackets: Vec<TaxBracket>,
    },
    /// A single flat-rate withholding on the taxable base.
    Flat {
        /// Rate as a fraction.
        rate: Decimal,
    },
}

impl TaxRegime {
    fn validate(&self, country: &str) -> EngineResult<()> {
        let context = format!("jurisdictions '{}'", country);
        match self {
            TaxRegime::Domestic => Ok(()),
            TaxRegime::Progressive {
                flat_levies,
                brackets,
            } => {
                for levy in flat_levies {
                    if levy.rate < Decimal::ZERO
                        || levy.base_fraction <= Decimal::ZERO
                        || levy.base_fraction > Decimal::ONE
                    {
                        return Err(EngineError::InvalidConfiguration {
                            context,
                            message: format!(
                                "levy '{}' needs a non-negative rate and a base fraction in (0, 1]",
                                levy.code
                            ),
                        });
                    }
                }
                validate_bands(brackets, &context)
            }
            TaxRegime::Flat { rate } => {
                if *rate < Decimal::ZERO {
                    return Err(EngineError::InvalidConfiguration {
                        context,
                        message: format!("flat rate must be non-negative, got {}", rate),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Root of `jurisdictions.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionsConfig {
    /// Regime per residence country code.
    pub jurisdictions: HashMap<String, TaxRegime>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: PayrollSettings,
    rate_tables: BTreeMap<i32, Arc<RateTable>>,
    jurisdictions: HashMap<String, TaxRegime>,
}

impl PayrollConfig {
    /// Assembles and validates a configuration from its component parts.
    ///
    /// Fails with `InvalidConfiguration` on duplicate years, invalid tiers,
    /// invalid regimes, or a domestic country that is not mapped to the
    /// domestic regime.
    pub fn new(
        settings: PayrollSettings,
        rate_tables: Vec<RateTable>,
        jurisdictions: HashMap<String, TaxRegime>,
    ) -> EngineResult<Self> {
        let mut tables = BTreeMap::new();
        for table in rate_tables {
            table.validate()?;
            let year = table.effective_year;
            if tables.insert(year, Arc::new(table)).is_some() {
                return Err(EngineError::InvalidConfiguration {
                    context: "rates".to_string(),
                    message: format!("more than one rate table for year {}", year),
                });
            }
        }

        let jurisdictions: HashMap<String, TaxRegime> = jurisdictions
            .into_iter()
            .map(|(country, regime)| (country.trim().to_uppercase(), regime))
            .collect();
        for (country, regime) in &jurisdictions {
            regime.validate(country)?;
        }

        let domestic = settings.metadata.domestic_country.trim().to_uppercase();
        if !matches!(jurisdictions.get(&domestic), Some(TaxRegime::Domestic)) {
            return Err(EngineError::InvalidConfiguration {
                context: "jurisdictions".to_string(),
                message: format!(
                    "domestic country '{}' must be configured with the domestic regime",
                    domestic
                ),
            });
        }

        if !(1..=12).contains(&settings.pto.leave_year_start_month) {
            return Err(EngineError::InvalidConfiguration {
                context: "payroll.yaml pto".to_string(),
                message: format!(
                    "leave_year_start_month must be 1-12, got {}",
                    settings.pto.leave_year_start_month
                ),
            });
        }

        Ok(Self {
            settings,
            rate_tables: tables,
            jurisdictions,
        })
    }

    /// Returns the payroll settings.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Returns all rate tables keyed by effective year.
    pub fn rate_tables(&self) -> &BTreeMap<i32, Arc<RateTable>> {
        &self.rate_tables
    }

    /// Returns the tax regimes keyed by upper-case country code.
    pub fn jurisdictions(&self) -> &HashMap<String, TaxRegime> {
        &self.jurisdictions
    }
}
