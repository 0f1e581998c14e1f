//! Tier splitting and monetary rounding.
//!
//! Contribution tiers and progressive tax brackets share the same shape: an
//! ascending, contiguous list of `[lower, upper)` bands where only the last
//! band may be unbounded. The [`Band`] trait captures that shape so that
//! both are validated and split by the same code.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{TaxBracket, Tier};
use crate::error::{EngineError, EngineResult};

/// A `[lower, upper)` slice of a base with one or more rates attached.
pub trait Band {
    /// Inclusive lower bound.
    fn lower_bound(&self) -> Decimal;

    /// Exclusive upper bound, or `None` when unbounded.
    fn upper_bound(&self) -> Option<Decimal>;

    /// Every rate carried by the band.
    fn rates(&self) -> Vec<Decimal>;

    /// The part of `base` that falls inside this band.
    ///
    /// `max(0, min(upper, base) - lower)`.
    fn portion_of(&self, base: Decimal) -> Decimal {
        let top = match self.upper_bound() {
            Some(upper) => upper.min(base),
            None => base,
        };
        (top - self.lower_bound()).max(Decimal::ZERO)
    }
}

/// Checks that bands are non-empty, ascending, contiguous and non-overlapping,
/// that only the last band is unbounded, and that every rate is non-negative.
pub fn validate_bands<B: Band>(bands: &[B], context: &str) -> EngineResult<()> {
    let invalid = |message: String| EngineError::InvalidConfiguration {
        context: context.to_string(),
        message,
    };

    let Some(first) = bands.first() else {
        return Err(invalid("at least one tier is required".to_string()));
    };
    if first.lower_bound() < Decimal::ZERO {
        return Err(invalid(format!(
            "first tier starts below zero ({})",
            first.lower_bound()
        )));
    }

    for (index, band) in bands.iter().enumerate() {
        if let Some(upper) = band.upper_bound().filter(|upper| *upper <= band.lower_bound()) {
            return Err(invalid(format!(
                "tier {} has upper bound {} not above lower bound {}",
                index,
                upper,
                band.lower_bound()
            )));
        }

        if let Some(rate) = band.rates().into_iter().find(|r| *r < Decimal::ZERO) {
            return Err(invalid(format!("tier {} has negative rate {}", index, rate)));
        }

        if index > 0 {
            let previous = &bands[index - 1];
            match previous.upper_bound() {
                None => {
                    return Err(invalid(format!(
                        "tier {} is unbounded but is not the last tier",
                        index - 1
                    )));
                }
                Some(upper) if upper != band.lower_bound() => {
                    return Err(invalid(format!(
                        "tier {} starts at {} but the previous tier ends at {}",
                        index,
                        band.lower_bound(),
                        upper
                    )));
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

/// Rounds a monetary amount to 2 decimal places, half to even.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("259.2559").unwrap()), Decimal::from_str("259.26").unwrap());
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.12").unwrap());
/// assert_eq!(round_money(Decimal::from_str("0.135").unwrap()), Decimal::from_str("0.14").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Unrounded employee and employer amounts from a tier split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierAmounts {
    /// Sum over tiers of portion x employee rate.
    pub employee: Decimal,
    /// Sum over tiers of portion x employer rate.
    pub employer: Decimal,
}

/// Applies contribution tiers to a base, without rounding.
///
/// Rounding happens once per category and payer, after all tiers are summed.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_tiers;
/// use payroll_engine::config::Tier;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// let tiers = vec![
///     Tier { lower_bound: d("0"), upper_bound: Some(d("3971")), employee_rate: d("0.0401"), employer_rate: d("0.0601") },
///     Tier { lower_bound: d("3971"), upper_bound: None, employee_rate: d("0.0972"), employer_rate: d("0.1457") },
/// ];
/// let amounts = apply_tiers(d("5000"), &tiers);
/// assert_eq!(amounts.employee, d("259.2559"));
/// ```
pub fn apply_tiers(base: Decimal, tiers: &[Tier]) -> TierAmounts {
    tiers
        .iter()
        .fold(TierAmounts::default(), |acc, tier| {
            let portion = tier.portion_of(base);
            TierAmounts {
                employee: acc.employee + portion * tier.employee_rate,
                employer: acc.employer + portion * tier.employer_rate,
            }
        })
}

/// Applies a progressive bracket schedule to a base, without rounding.
pub fn apply_brackets(base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    brackets
        .iter()
        .map(|bracket| bracket.portion_of(base) * bracket.rate)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tier(lower: &str, upper: Option<&str>, employee: &str, employer: &str) -> Tier {
        Tier {
            lower_bound: dec(lower),
            upper_bound: upper.map(dec),
            employee_rate: dec(employee),
            employer_rate: dec(employer),
        }
    }

    fn two_tiers() -> Vec<Tier> {
        vec![
            tier("0", Some("3971"), "0.0401", "0.0601"),
            tier("3971", None, "0.0972", "0.1457"),
        ]
    }

    #[test]
    fn test_base_below_threshold_uses_first_tier_only() {
        let amounts = apply_tiers(dec("3000"), &two_tiers());
        assert_eq!(amounts.employee, dec("120.3"));
        assert_eq!(amounts.employer, dec("180.3"));
    }

    #[test]
    fn test_base_exactly_on_threshold() {
        let amounts = apply_tiers(dec("3971"), &two_tiers());
        assert_eq!(amounts.employee, dec("159.2371"));
    }

    #[test]
    fn test_base_above_threshold_splits_across_tiers() {
        let amounts = apply_tiers(dec("5000"), &two_tiers());
        // 3971 x 0.0401 + 1029 x 0.0972
        assert_eq!(amounts.employee, dec("259.2559"));
        assert_eq!(round_money(amounts.employee), dec("259.26"));
        // 3971 x 0.0601 + 1029 x 0.1457
        assert_eq!(amounts.employer, dec("388.5824"));
    }

    #[test]
    fn test_zero_base_yields_zero() {
        let amounts = apply_tiers(Decimal::ZERO, &two_tiers());
        assert_eq!(amounts, TierAmounts::default());
    }

    #[test]
    fn test_bounded_last_tier_stops_contributing() {
        let tiers = vec![
            tier("0", Some("100"), "0.10", "0"),
            tier("100", Some("200"), "0.20", "0"),
        ];
        assert_eq!(apply_tiers(dec("500"), &tiers).employee, dec("30"));
    }

    #[test]
    fn test_round_money_is_half_even() {
        assert_eq!(round_money(dec("2.345")), dec("2.34"));
        assert_eq!(round_money(dec("2.355")), dec("2.36"));
        assert_eq!(round_money(dec("2.3451")), dec("2.35"));
        assert_eq!(round_money(dec("-2.345")), dec("-2.34"));
    }

    #[test]
    fn test_apply_brackets() {
        let brackets = vec![
            TaxBracket {
                lower_bound: dec("0"),
                upper_bound: Some(dec("1000")),
                rate: dec("0"),
            },
            TaxBracket {
                lower_bound: dec("1000"),
                upper_bound: None,
                rate: dec("0.10"),
            },
        ];
        assert_eq!(apply_brackets(dec("800"), &brackets), dec("0"));
        assert_eq!(apply_brackets(dec("2500"), &brackets), dec("150"));
    }

    #[test]
    fn test_validate_accepts_contiguous_bands() {
        assert!(validate_bands(&two_tiers(), "test").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let empty: Vec<Tier> = vec![];
        assert!(validate_bands(&empty, "test").is_err());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let tiers = vec![
            tier("0", Some("4000"), "0.01", "0.01"),
            tier("3971", None, "0.01", "0.01"),
        ];
        let err = validate_bands(&tiers, "rates/2025 category 'cmrc'").unwrap_err();
        match err {
            EngineError::InvalidConfiguration { context, message } => {
                assert_eq!(context, "rates/2025 category 'cmrc'");
                assert!(message.contains("3971"));
            }
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let tiers = vec![tier("100", Some("50"), "0.01", "0.01")];
        assert!(validate_bands(&tiers, "test").is_err());
    }

    #[test]
    fn test_validate_rejects_negative_lower_bound() {
        let tiers = vec![tier("-1", None, "0.01", "0.01")];
        assert!(validate_bands(&tiers, "test").is_err());
    }
}
