//! Remark classification.
//!
//! Operators annotate payroll variables with free text such as
//! "entrée le 01/03" or "prime exceptionnelle". The classifier turns that
//! text into an [`EdgeCaseCategory`], a confidence, and a typed
//! [`EdgeCaseSignal`] carrying any value captured from the text.
//!
//! Classification is driven by the static [`RULES`] table. Every rule is
//! evaluated; the match with the highest specificity wins (a captured date,
//! amount or day count beats a bare keyword) and ties go to the category
//! with the higher priority in [`EdgeCaseCategory::PRIORITY`].

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::EdgeCaseCategory;

/// Confidence for a match that captured a usable value.
pub const CAPTURED_CONFIDENCE: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

/// Confidence for a bare keyword match.
pub const KEYWORD_CONFIDENCE: Decimal = Decimal::from_parts(70, 0, 0, false, 2);

/// What a rule extracts from the remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Nothing; the keyword alone is the evidence.
    Keyword,
    /// A `dd/mm` or `dd-mm` date in groups `day` and `month`.
    Date,
    /// A monetary amount in group `amount`.
    Amount,
    /// A percentage in group `percent`.
    Percent,
    /// A number of days in group `days`.
    DayCount,
    /// An inclusive `from`/`to` day-of-month range.
    DayRange,
}

/// `(category, pattern, capture)` rules, evaluated in full for every remark.
///
/// Patterns are case-insensitive. Adding a category or a locale means adding
/// rows here.
pub const RULES: &[(EdgeCaseCategory, &str, Capture)] = &[
    // Departures
    (
        EdgeCaseCategory::Departure,
        r"\b(?:sortie|d[ée]part|fin\s+de\s+contrat|fin|quitte|left|leaves?)\s+(?:le\s+|on\s+)?(?P<day>\d{1,2})[/-](?P<month>\d{1,2})(?:[/-]\d{2,4})?",
        Capture::Date,
    ),
    (
        EdgeCaseCategory::Departure,
        r"\b(?:sortie|d[ée]part|d[ée]mission|licenciement|fin\s+de\s+contrat|rupture\s+conventionnelle|departure|resign(?:ed|ation)?|terminat(?:ed|ion))\b",
        Capture::Keyword,
    ),
    // New hires
    (
        EdgeCaseCategory::NewHire,
        r"\b(?:entr[ée]e|embauch[ée]e?|arriv[ée]e|d[ée]but|start(?:s|ed)?|hired)\s+(?:le\s+|on\s+)?(?P<day>\d{1,2})[/-](?P<month>\d{1,2})(?:[/-]\d{2,4})?",
        Capture::Date,
    ),
    (
        EdgeCaseCategory::NewHire,
        r"\b(?:entr[ée]e|embauche|nouvel(?:le)?\s+(?:embauche|recrue)|new\s+hire|onboarding)\b",
        Capture::Keyword,
    ),
    // Salary changes
    (
        EdgeCaseCategory::SalaryChange,
        r"(?:nouveau\s+salaire|salaire\s+revu|new\s+salary)\s*(?:de\s+|à\s+|a\s+|:\s*|of\s+|to\s+)?(?P<amount>\d+(?:[.,]\d{1,2})?)",
        Capture::Amount,
    ),
    (
        EdgeCaseCategory::SalaryChange,
        r"(?:augmentation|revalorisation|raise)\s*(?:de\s+|of\s+|:\s*)?(?P<percent>\d+(?:[.,]\d+)?)\s*%",
        Capture::Percent,
    ),
    (
        EdgeCaseCategory::SalaryChange,
        r"\b(?:augmentation|nouveau\s+salaire|revalorisation|changement\s+de\s+salaire|salary\s+change|raise)\b",
        Capture::Keyword,
    ),
    // Bonuses
    (
        EdgeCaseCategory::Bonus,
        r"(?:prime|bonus|gratification)[^\d/%]{0,30}?(?P<amount>\d+(?:[.,]\d{1,2})?)\s*(?:€|eur)",
        Capture::Amount,
    ),
    (
        EdgeCaseCategory::Bonus,
        r"\b(?:prime|bonus|gratification|13e\s+mois|treizi[èe]me\s+mois|13th\s+month)\b",
        Capture::Keyword,
    ),
    // Unpaid leave
    (
        EdgeCaseCategory::UnpaidLeave,
        r"(?P<days>\d+(?:[.,]\d+)?)\s*(?:jours?|j|days?)\s+(?:de\s+)?(?:cong[ée]s?\s+sans\s+solde|css|absence\s+non\s+r[ée]mun[ée]r[ée]e|unpaid(?:\s+leave)?)",
        Capture::DayCount,
    ),
    (
        EdgeCaseCategory::UnpaidLeave,
        r"(?:cong[ée]s?\s+sans\s+solde|unpaid\s+leave)\s*(?:de\s+|:\s*|of\s+)?(?P<days>\d+(?:[.,]\d+)?)\s*(?:jours?|j|days?)\b",
        Capture::DayCount,
    ),
    (
        EdgeCaseCategory::UnpaidLeave,
        r"(?:cong[ée]s?\s+sans\s+solde|unpaid\s+leave)\s+(?:du|from)\s+(?P<from>\d{1,2})(?:/\d{1,2})?\s+(?:au|to)\s+(?P<to>\d{1,2})(?:/\d{1,2})?",
        Capture::DayRange,
    ),
    (
        EdgeCaseCategory::UnpaidLeave,
        r"\b(?:cong[ée]s?\s+sans\s+solde|sans\s+solde|arr[êe]t\s+maladie|absence\s+non\s+r[ée]mun[ée]r[ée]e|unpaid\s+leave|sick\s+leave)\b",
        Capture::Keyword,
    ),
    // Proration
    (
        EdgeCaseCategory::Prorate,
        r"\b(?:du|from)\s+(?P<from>\d{1,2})(?:/\d{1,2})?\s+(?:au|to)\s+(?P<to>\d{1,2})(?:/\d{1,2})?",
        Capture::DayRange,
    ),
    (
        EdgeCaseCategory::Prorate,
        r"(?P<days>\d+(?:[.,]\d+)?)\s*(?:jours?|days?)\s+(?:travaill[ée]s|worked)",
        Capture::DayCount,
    ),
    (
        EdgeCaseCategory::Prorate,
        r"(?:prorata|prorated?)\s*(?:de\s+|sur\s+|:\s*|over\s+)?(?P<days>\d+(?:[.,]\d+)?)\s*(?:jours?|j|days?)\b",
        Capture::DayCount,
    ),
    (
        EdgeCaseCategory::Prorate,
        r"\b(?:prorata|proratis[ée]e?|prorated?|mois\s+incomplet|partial\s+month)\b",
        Capture::Keyword,
    ),
];

struct CompiledRule {
    category: EdgeCaseCategory,
    pattern: Regex,
    capture: Capture,
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(category, pattern, capture)| CompiledRule {
            category: *category,
            pattern: Regex::new(&format!("(?i){}", pattern))
                .expect("classifier rule patterns are valid regexes"),
            capture: *capture,
        })
        .collect()
});

/// How specific the winning match was.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    /// No rule matched.
    #[default]
    None,
    /// A keyword matched but no value was captured.
    Keyword,
    /// A date, amount, percentage or day count was captured and validated.
    Captured,
}

/// A `dd/mm` date captured from a remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkDate {
    /// Day of month (1-31).
    pub day: u32,
    /// Month (1-12).
    pub month: u32,
}

/// A stretch of days stated in a remark.
///
/// Calendar ranges and working-day counts are kept apart so a correction
/// never divides one by the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum DaySpan {
    /// Inclusive day-of-month range ("du 1 au 15").
    Calendar {
        /// First day of the range.
        from: u32,
        /// Last day of the range.
        to: u32,
    },
    /// A count of working days ("12 jours travaillés").
    WorkingDays {
        /// Number of days.
        days: Decimal,
    },
}

impl DaySpan {
    /// Calendar days covered by a range; `None` for a working-day count.
    pub fn calendar_days(&self) -> Option<u32> {
        match *self {
            DaySpan::Calendar { from, to } => Some(to + 1 - from),
            DaySpan::WorkingDays { .. } => None,
        }
    }
}

/// The typed signal behind a classification.
///
/// Every variant carries the value a deterministic correction needs, or
/// `None` when the remark only contained a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeCaseSignal {
    /// Joined during the period.
    NewHire {
        /// First day worked.
        start: Option<RemarkDate>,
    },
    /// Left during the period.
    Departure {
        /// Last day worked.
        end: Option<RemarkDate>,
    },
    /// Base salary changed.
    SalaryChange {
        /// The new monthly gross, when stated.
        new_amount: Option<Decimal>,
        /// The increase in percent, when stated.
        percent: Option<Decimal>,
    },
    /// One-off payment.
    Bonus {
        /// The bonus amount, when stated.
        amount: Option<Decimal>,
    },
    /// Unpaid absence.
    UnpaidLeave {
        /// The unpaid absence, when stated.
        span: Option<DaySpan>,
    },
    /// Partial period.
    Prorate {
        /// The part of the period actually worked, when stated.
        span: Option<DaySpan>,
    },
    /// Nothing to act on.
    None,
}

impl EdgeCaseSignal {
    /// A signal of the given category with nothing captured.
    pub fn bare(category: EdgeCaseCategory) -> Self {
        match category {
            EdgeCaseCategory::NewHire => EdgeCaseSignal::NewHire { start: None },
            EdgeCaseCategory::Departure => EdgeCaseSignal::Departure { end: None },
            EdgeCaseCategory::SalaryChange => EdgeCaseSignal::SalaryChange {
                new_amount: None,
                percent: None,
            },
            EdgeCaseCategory::Bonus => EdgeCaseSignal::Bonus { amount: None },
            EdgeCaseCategory::UnpaidLeave => EdgeCaseSignal::UnpaidLeave { span: None },
            EdgeCaseCategory::Prorate => EdgeCaseSignal::Prorate { span: None },
            EdgeCaseCategory::None => EdgeCaseSignal::None,
        }
    }

    /// The category this signal belongs to.
    pub fn category(&self) -> EdgeCaseCategory {
        match self {
            EdgeCaseSignal::NewHire { .. } => EdgeCaseCategory::NewHire,
            EdgeCaseSignal::Departure { .. } => EdgeCaseCategory::Departure,
            EdgeCaseSignal::SalaryChange { .. } => EdgeCaseCategory::SalaryChange,
            EdgeCaseSignal::Bonus { .. } => EdgeCaseCategory::Bonus,
            EdgeCaseSignal::UnpaidLeave { .. } => EdgeCaseCategory::UnpaidLeave,
            EdgeCaseSignal::Prorate { .. } => EdgeCaseCategory::Prorate,
            EdgeCaseSignal::None => EdgeCaseCategory::None,
        }
    }
}

/// The outcome of classifying one remark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The winning category.
    pub category: EdgeCaseCategory,
    /// Confidence in the category, from 0 to 1.
    pub confidence: Decimal,
    /// How specific the winning match was.
    pub specificity: Specificity,
    /// The typed signal, with any captured value.
    pub signal: EdgeCaseSignal,
    /// The remark fragment that matched.
    pub matched_text: Option<String>,
}

impl Classification {
    /// The classification of an empty or unmatched remark.
    pub fn none() -> Self {
        Self {
            category: EdgeCaseCategory::None,
            confidence: Decimal::ZERO,
            specificity: Specificity::None,
            signal: EdgeCaseSignal::None,
            matched_text: None,
        }
    }

    /// Builds a classification from an explicit signal and confidence.
    ///
    /// Used when the category comes from somewhere other than the rule
    /// table, e.g. a reviewer's decision.
    pub fn from_signal(signal: EdgeCaseSignal, confidence: Decimal) -> Self {
        Self {
            category: signal.category(),
            confidence,
            specificity: Specificity::Keyword,
            signal,
            matched_text: None,
        }
    }
}

/// Classifies free-text remarks into edge-case categories.
///
/// # Examples
///
/// ```
/// use payroll_engine::edge_case::RemarkClassifier;
/// use payroll_engine::models::EdgeCaseCategory;
/// use rust_decimal::Decimal;
///
/// let result = RemarkClassifier::classify("entrée le 01/03");
/// assert_eq!(result.category, EdgeCaseCategory::NewHire);
/// assert!(result.confidence >= Decimal::new(85, 2));
///
/// let result = RemarkClassifier::classify("");
/// assert_eq!(result.category, EdgeCaseCategory::None);
/// assert_eq!(result.confidence, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RemarkClassifier;

impl RemarkClassifier {
    /// Classifies a remark. Pure and deterministic.
    pub fn classify(remark: &str) -> Classification {
        let remark = remark.trim();
        if remark.is_empty() {
            return Classification::none();
        }

        let mut best: Option<(Specificity, EdgeCaseSignal, String)> = None;

        for rule in COMPILED_RULES.iter() {
            for caps in rule.pattern.captures_iter(remark) {
                let captured = match rule.capture {
                    Capture::Keyword => None,
                    capture => extract_signal(rule.category, capture, &caps),
                };
                let (specificity, signal) = match captured {
                    Some(signal) => (Specificity::Captured, signal),
                    None => (Specificity::Keyword, EdgeCaseSignal::bare(rule.category)),
                };

                let better = match &best {
                    None => true,
                    Some((best_specificity, best_signal, _)) => {
                        specificity > *best_specificity
                            || (specificity == *best_specificity
                                && rule.category.priority() < best_signal.category().priority())
                    }
                };
                if better {
                    let matched = caps.get(0).map_or("", |m| m.as_str()).to_string();
                    best = Some((specificity, signal, matched));
                }
            }
        }

        match best {
            Some((specificity, signal, matched)) => Classification {
                category: signal.category(),
                confidence: match specificity {
                    Specificity::Captured => CAPTURED_CONFIDENCE,
                    Specificity::Keyword => KEYWORD_CONFIDENCE,
                    Specificity::None => Decimal::ZERO,
                },
                specificity,
                signal,
                matched_text: Some(matched),
            },
            None => Classification::none(),
        }
    }
}

fn parse_number(caps: &Captures<'_>, group: &str) -> Option<Decimal> {
    let raw = caps.name(group)?.as_str().replace(',', ".");
    raw.parse::<Decimal>().ok()
}

fn parse_day(caps: &Captures<'_>, group: &str) -> Option<u32> {
    caps.name(group)?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|day| (1..=31).contains(day))
}

/// Extracts a captured value and validates it; `None` downgrades the match
/// to keyword specificity.
fn extract_signal(
    category: EdgeCaseCategory,
    capture: Capture,
    caps: &Captures<'_>,
) -> Option<EdgeCaseSignal> {
    match (category, capture) {
        (EdgeCaseCategory::NewHire | EdgeCaseCategory::Departure, Capture::Date) => {
            let day = parse_day(caps, "day")?;
            let month = caps
                .name("month")?
                .as_str()
                .parse::<u32>()
                .ok()
                .filter(|month| (1..=12).contains(month))?;
            let date = RemarkDate { day, month };
            Some(if category == EdgeCaseCategory::NewHire {
                EdgeCaseSignal::NewHire { start: Some(date) }
            } else {
                EdgeCaseSignal::Departure { end: Some(date) }
            })
        }
        (EdgeCaseCategory::SalaryChange, Capture::Amount) => {
            let amount = parse_number(caps, "amount").filter(|a| *a > Decimal::ZERO)?;
            Some(EdgeCaseSignal::SalaryChange {
                new_amount: Some(amount),
                percent: None,
            })
        }
        (EdgeCaseCategory::SalaryChange, Capture::Percent) => {
            let percent = parse_number(caps, "percent").filter(|p| *p > Decimal::ZERO)?;
            Some(EdgeCaseSignal::SalaryChange {
                new_amount: None,
                percent: Some(percent),
            })
        }
        (EdgeCaseCategory::Bonus, Capture::Amount) => {
            let amount = parse_number(caps, "amount").filter(|a| *a > Decimal::ZERO)?;
            Some(EdgeCaseSignal::Bonus {
                amount: Some(amount),
            })
        }
        (EdgeCaseCategory::UnpaidLeave | EdgeCaseCategory::Prorate, Capture::DayCount) => {
            let days = parse_number(caps, "days")
                .filter(|d| *d > Decimal::ZERO && *d <= Decimal::from(31))?;
            Some(day_signal(category, DaySpan::WorkingDays { days }))
        }
        (EdgeCaseCategory::UnpaidLeave | EdgeCaseCategory::Prorate, Capture::DayRange) => {
            let from = parse_day(caps, "from")?;
            let to = parse_day(caps, "to").filter(|to| *to >= from)?;
            Some(day_signal(category, DaySpan::Calendar { from, to }))
        }
        _ => None,
    }
}

fn day_signal(category: EdgeCaseCategory, span: DaySpan) -> EdgeCaseSignal {
    if category == EdgeCaseCategory::UnpaidLeave {
        EdgeCaseSignal::UnpaidLeave { span: Some(span) }
    } else {
        EdgeCaseSignal::Prorate { span: Some(span) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(COMPILED_RULES.len(), RULES.len());
    }

    #[test]
    fn test_empty_remark_is_none() {
        for remark in ["", "   ", "\n"] {
            let result = RemarkClassifier::classify(remark);
            assert_eq!(result, Classification::none());
        }
    }

    #[test]
    fn test_unrelated_remark_is_none() {
        let result = RemarkClassifier::classify("RAS, rien à signaler");
        assert_eq!(result.category, EdgeCaseCategory::None);
        assert_eq!(result.confidence, Decimal::ZERO);
    }

    #[test]
    fn test_new_hire_with_date() {
        let result = RemarkClassifier::classify("entrée le 01/03");
        assert_eq!(result.category, EdgeCaseCategory::NewHire);
        assert_eq!(result.confidence, dec("0.90"));
        assert_eq!(result.specificity, Specificity::Captured);
        assert_eq!(
            result.signal,
            EdgeCaseSignal::NewHire {
                start: Some(RemarkDate { day: 1, month: 3 })
            }
        );
        assert_eq!(result.matched_text.as_deref(), Some("entrée le 01/03"));
    }

    #[test]
    fn test_unaccented_and_uppercase_remark() {
        let result = RemarkClassifier::classify("ENTREE LE 15/09/2025");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::NewHire {
                start: Some(RemarkDate { day: 15, month: 9 })
            }
        );
    }

    #[test]
    fn test_bonus_keyword_only() {
        let result = RemarkClassifier::classify("prime exceptionnelle");
        assert_eq!(result.category, EdgeCaseCategory::Bonus);
        assert!(result.confidence >= dec("0.5") && result.confidence < dec("0.85"));
        assert_eq!(result.signal, EdgeCaseSignal::Bonus { amount: None });
    }

    #[test]
    fn test_bonus_with_amount() {
        let result = RemarkClassifier::classify("prime exceptionnelle de 500 €");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::Bonus {
                amount: Some(dec("500"))
            }
        );
        assert_eq!(result.confidence, dec("0.90"));
    }

    #[test]
    fn test_departure_keyword() {
        let result = RemarkClassifier::classify("Démission");
        assert_eq!(result.category, EdgeCaseCategory::Departure);
        assert_eq!(result.specificity, Specificity::Keyword);
    }

    #[test]
    fn test_invalid_date_downgrades_to_keyword() {
        let result = RemarkClassifier::classify("sortie le 45/13");
        assert_eq!(result.category, EdgeCaseCategory::Departure);
        assert_eq!(result.specificity, Specificity::Keyword);
        assert_eq!(result.confidence, dec("0.70"));
        assert_eq!(result.signal, EdgeCaseSignal::Departure { end: None });
    }

    #[test]
    fn test_captured_value_beats_higher_priority_keyword() {
        // departure keyword vs. prorate with a captured range
        let result = RemarkClassifier::classify("départ, payer du 1 au 10");
        assert_eq!(result.category, EdgeCaseCategory::Prorate);
        assert_eq!(
            result.signal,
            EdgeCaseSignal::Prorate {
                span: Some(DaySpan::Calendar { from: 1, to: 10 })
            }
        );
    }

    #[test]
    fn test_equal_specificity_resolves_by_priority() {
        // Two captured dates: new hire and departure. Departure ranks first.
        let result = RemarkClassifier::classify("entrée le 01/03, sortie le 28/03");
        assert_eq!(result.category, EdgeCaseCategory::Departure);
        assert_eq!(
            result.signal,
            EdgeCaseSignal::Departure {
                end: Some(RemarkDate { day: 28, month: 3 })
            }
        );
    }

    #[test]
    fn test_date_and_number_tie_resolves_by_priority() {
        // A captured date (new hire) and a captured amount (bonus) are the
        // same specificity; new hire has the higher priority.
        let result = RemarkClassifier::classify("prime de 300 €, embauchée le 10/06");
        assert_eq!(result.category, EdgeCaseCategory::NewHire);
    }

    #[test]
    fn test_unpaid_leave_range_outranks_prorate_range() {
        let result = RemarkClassifier::classify("congé sans solde du 10 au 14");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::UnpaidLeave {
                span: Some(DaySpan::Calendar { from: 10, to: 14 })
            }
        );
    }

    #[test]
    fn test_unpaid_leave_day_count() {
        let result = RemarkClassifier::classify("3 jours de congé sans solde");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::UnpaidLeave {
                span: Some(DaySpan::WorkingDays { days: dec("3") })
            }
        );
    }

    #[test]
    fn test_salary_change_with_new_amount() {
        let result = RemarkClassifier::classify("nouveau salaire 3800,50");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::SalaryChange {
                new_amount: Some(dec("3800.50")),
                percent: None,
            }
        );
    }

    #[test]
    fn test_salary_change_with_percent() {
        let result = RemarkClassifier::classify("augmentation de 5%");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::SalaryChange {
                new_amount: None,
                percent: Some(dec("5")),
            }
        );
    }

    #[test]
    fn test_prorate_days_worked() {
        let result = RemarkClassifier::classify("12 jours travaillés");
        assert_eq!(
            result.signal,
            EdgeCaseSignal::Prorate {
                span: Some(DaySpan::WorkingDays { days: dec("12") })
            }
        );
    }

    #[test]
    fn test_inverted_range_downgrades_to_keyword() {
        let result = RemarkClassifier::classify("du 20 au 5");
        assert_eq!(result.category, EdgeCaseCategory::Prorate);
        assert_eq!(result.specificity, Specificity::Keyword);
        assert_eq!(result.signal, EdgeCaseSignal::Prorate { span: None });
    }

    #[test]
    fn test_day_range_is_a_calendar_span() {
        let result = RemarkClassifier::classify("payé du 1 au 15");
        assert_eq!(result.category, EdgeCaseCategory::Prorate);
        let span = match result.signal {
            EdgeCaseSignal::Prorate { span: Some(span) } => span,
            other => panic!("Expected a prorate span, got {:?}", other),
        };
        assert_eq!(span, DaySpan::Calendar { from: 1, to: 15 });
        assert_eq!(span.calendar_days(), Some(15));
        assert_eq!(DaySpan::WorkingDays { days: dec("12") }.calendar_days(), None);
    }

    #[test]
    fn test_debut_date_is_a_new_hire() {
        let result = RemarkClassifier::classify("début le 15/03");
        assert_eq!(result.confidence, dec("0.90"));
        assert_eq!(
            result.signal,
            EdgeCaseSignal::NewHire {
                start: Some(RemarkDate { day: 15, month: 3 })
            }
        );
    }

    #[test]
    fn test_fin_date_is_a_departure() {
        let result = RemarkClassifier::classify("fin le 15/03");
        assert_eq!(result.confidence, dec("0.90"));
        assert_eq!(
            result.signal,
            EdgeCaseSignal::Departure {
                end: Some(RemarkDate { day: 15, month: 3 })
            }
        );
    }

    #[test]
    fn test_dash_separated_dates_are_captured() {
        let hire = RemarkClassifier::classify("entrée le 15-03");
        assert_eq!(hire.specificity, Specificity::Captured);
        assert_eq!(
            hire.signal,
            EdgeCaseSignal::NewHire {
                start: Some(RemarkDate { day: 15, month: 3 })
            }
        );

        let departure = RemarkClassifier::classify("sortie le 28-03-2025");
        assert_eq!(
            departure.signal,
            EdgeCaseSignal::Departure {
                end: Some(RemarkDate { day: 28, month: 3 })
            }
        );
    }

    #[test]
    fn test_fin_inside_a_word_is_ignored() {
        let result = RemarkClassifier::classify("enfin 12/03 ok");
        assert_eq!(result.category, EdgeCaseCategory::None);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let remark = "entrée le 01/03, prime de 200 €, 2 jours sans solde";
        let first = RemarkClassifier::classify(remark);
        for _ in 0..10 {
            assert_eq!(RemarkClassifier::classify(remark), first);
        }
    }

    #[test]
    fn test_signal_category_round_trip() {
        for category in EdgeCaseCategory::PRIORITY {
            assert_eq!(EdgeCaseSignal::bare(category).category(), category);
        }
    }
}
