//! Confidence-gated edge-case resolution.
//!
//! The agent takes a draft payslip and the classification of its remark and
//! decides, per the configured thresholds:
//!
//! - confidence at or above `auto_correct_threshold` with a deterministic
//!   correction: apply it, flag the payslip, no review;
//! - confidence at or above `review_threshold` otherwise: leave the numbers
//!   untouched, flag the payslip for manual review;
//! - below `review_threshold`: pass through unflagged.
//!
//! Independently of the remark, a gross salary that moved sharply against
//! the previous period is flagged for review.

use rust_decimal::Decimal;

use crate::calculation::round_money;
use crate::config::EdgeCasePolicy;
use crate::models::{EdgeCaseCategory, EdgeCaseModification, EmployeeInput, PayslipResult};

use super::classifier::{Classification, DaySpan, EdgeCaseSignal, RemarkDate, Specificity};

/// Numeric context the agent uses to corroborate or apply a correction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeCaseEvidence {
    /// The operator remark, attached to flagged payslips.
    pub remark: String,
    /// Gross salary of the previous period.
    pub previous_gross_salary: Option<Decimal>,
    /// Working days in the period; falls back to the policy default.
    pub days_in_period: Option<Decimal>,
}

impl EdgeCaseEvidence {
    /// Collects the evidence carried by an employee input.
    pub fn from_input(input: &EmployeeInput) -> Self {
        Self {
            remark: input.remark_text.clone(),
            previous_gross_salary: input.previous_gross_salary,
            days_in_period: input.days_in_period,
        }
    }
}

/// A deterministic correction for a signal.
enum Correction {
    /// Scale gross, contributions and tax by `ratio`.
    Scale { ratio: Decimal, reason: String },
    /// The figures already reflect the signal; nothing to change.
    Confirm { reason: String },
}

/// Resolves classified remarks against a draft payslip.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::calculation::compute_draft;
/// use payroll_engine::edge_case::{EdgeCaseAgent, EdgeCaseEvidence, RemarkClassifier};
/// use payroll_engine::models::{EmployeeInput, EmploymentClass, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/monaco")?;
/// let mut input = EmployeeInput::new("S001", Decimal::from(4000), EmploymentClass::Standard, "MC");
/// input.remark_text = "prime exceptionnelle".to_string();
///
/// let draft = compute_draft(&input, PayPeriod::new(2025, 3), &config)?;
/// let agent = EdgeCaseAgent::new(config.edge_case_policy().clone());
/// let classification = RemarkClassifier::classify(&input.remark_text);
/// let result = agent.resolve(draft, &classification, &EdgeCaseEvidence::from_input(&input));
/// assert!(result.requires_manual_review);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EdgeCaseAgent {
    policy: EdgeCasePolicy,
}

impl EdgeCaseAgent {
    /// Creates an agent with the given thresholds.
    pub fn new(policy: EdgeCasePolicy) -> Self {
        Self { policy }
    }

    /// Returns the agent's policy.
    pub fn policy(&self) -> &EdgeCasePolicy {
        &self.policy
    }

    /// Produces the final payslip from a draft and a classification.
    pub fn resolve(
        &self,
        draft: PayslipResult,
        classification: &Classification,
        evidence: &EdgeCaseEvidence,
    ) -> PayslipResult {
        let mut result = draft;
        let draft_gross = result.gross_salary;

        let confidence = self.corroborated_confidence(classification, draft_gross, evidence);
        result.edge_case_category = classification.category;
        result.edge_case_confidence = confidence;
        result.edge_case_flag = false;
        result.requires_manual_review = false;
        result.edge_case_reason = None;

        let decision;
        if classification.category == EdgeCaseCategory::None
            || confidence < self.policy.review_threshold
        {
            decision = "pass_through";
        } else if confidence >= self.policy.auto_correct_threshold {
            result.edge_case_flag = true;
            match self.correction(&classification.signal, &result, evidence) {
                Ok(Correction::Scale { ratio, reason }) => {
                    apply_scale(&mut result, ratio, &reason, confidence);
                    result.edge_case_reason = Some(reason);
                    decision = "auto_corrected";
                }
                Ok(Correction::Confirm { reason }) => {
                    result.edge_case_reason = Some(reason);
                    decision = "confirmed";
                }
                Err(why) => {
                    result.requires_manual_review = true;
                    result.edge_case_reason = Some(format!(
                        "{} detected but no deterministic correction: {}",
                        classification.category.as_str(),
                        why
                    ));
                    decision = "manual_review";
                }
            }
        } else {
            result.edge_case_flag = true;
            result.requires_manual_review = true;
            result.edge_case_reason = Some(format!(
                "{} detected with confidence {} below the auto-correction threshold {}",
                classification.category.as_str(),
                confidence,
                self.policy.auto_correct_threshold
            ));
            decision = "manual_review";
        }

        let findings = self.variance_findings(draft_gross, result.edge_case_flag, evidence);
        if !findings.is_empty() {
            result.edge_case_flag = true;
            result.requires_manual_review = true;
            let mut reasons: Vec<String> = result.edge_case_reason.take().into_iter().collect();
            reasons.extend(findings.iter().cloned());
            result.edge_case_reason = Some(reasons.join("; "));
        }

        let remark = evidence.remark.trim();
        if result.edge_case_flag && !remark.is_empty() {
            result.edge_case_remark = Some(remark.to_string());
        }

        if result.requires_manual_review {
            tracing::warn!(
                employee_id = %result.employee_id,
                category = classification.category.as_str(),
                confidence = %confidence,
                "Payslip flagged for manual review"
            );
        } else if result.edge_case_flag {
            tracing::info!(
                employee_id = %result.employee_id,
                category = classification.category.as_str(),
                decision,
                modifications = result.modifications.len(),
                "Edge case resolved automatically"
            );
        }

        let reasoning = result
            .edge_case_reason
            .clone()
            .unwrap_or_else(|| "No edge case to resolve".to_string());
        result.audit_trace.push(
            "edge_case_resolution",
            "Edge-Case Resolution",
            serde_json::json!({
                "category": classification.category,
                "confidence": confidence.to_string(),
                "specificity": classification.specificity,
                "signal": classification.signal,
                "previous_gross_salary": evidence.previous_gross_salary.map(|g| g.to_string()),
            }),
            serde_json::json!({
                "decision": decision,
                "edge_case_flag": result.edge_case_flag,
                "requires_manual_review": result.requires_manual_review,
                "modifications": result.modifications.len(),
                "variance_findings": findings,
            }),
            reasoning,
        );

        result
    }

    /// Raises a keyword-only salary change to the auto-correction threshold
    /// when the previous period shows a matching gross movement.
    fn corroborated_confidence(
        &self,
        classification: &Classification,
        gross: Decimal,
        evidence: &EdgeCaseEvidence,
    ) -> Decimal {
        let corroborated = classification.category == EdgeCaseCategory::SalaryChange
            && classification.specificity == Specificity::Keyword
            && classification.confidence >= self.policy.review_threshold
            && evidence
                .previous_gross_salary
                .is_some_and(|previous| previous > Decimal::ZERO && previous != gross);
        if corroborated {
            classification.confidence.max(self.policy.auto_correct_threshold)
        } else {
            classification.confidence
        }
    }

    /// Finds the deterministic correction for a signal, or explains why
    /// there is none.
    fn correction(
        &self,
        signal: &EdgeCaseSignal,
        draft: &PayslipResult,
        evidence: &EdgeCaseEvidence,
    ) -> Result<Correction, String> {
        let working_days = evidence
            .days_in_period
            .filter(|days| *days > Decimal::ZERO)
            .unwrap_or(self.policy.working_days_per_period);

        match *signal {
            EdgeCaseSignal::Prorate {
                span: Some(DaySpan::WorkingDays { days: days_worked }),
            } => {
                if days_worked > working_days {
                    return Err(format!(
                        "{} days worked exceeds {} days in period",
                        days_worked, working_days
                    ));
                }
                scale_or_confirm(
                    days_worked / working_days,
                    format!(
                        "Prorated to {} of {} working days",
                        days_worked.normalize(),
                        working_days.normalize()
                    ),
                )
            }
            EdgeCaseSignal::Prorate {
                span: Some(DaySpan::Calendar { from, to }),
            } => {
                let days_in_month = days_in_period_range(draft, to)?;
                let worked = to + 1 - from;
                scale_or_confirm(
                    Decimal::from(worked) / Decimal::from(days_in_month),
                    format!(
                        "Paid from day {} to day {}: {} of {} calendar days",
                        from, to, worked, days_in_month
                    ),
                )
            }
            EdgeCaseSignal::UnpaidLeave {
                span: Some(DaySpan::Calendar { from, to }),
            } => {
                let days_in_month = days_in_period_range(draft, to)?;
                let unpaid = to + 1 - from;
                if unpaid >= days_in_month {
                    return Err(format!(
                        "unpaid leave from day {} to day {} covers the whole of {}",
                        from,
                        to,
                        draft.period.label()
                    ));
                }
                scale_or_confirm(
                    Decimal::from(days_in_month - unpaid) / Decimal::from(days_in_month),
                    format!(
                        "Deducted {} unpaid calendar day(s) of {}",
                        unpaid, days_in_month
                    ),
                )
            }
            EdgeCaseSignal::UnpaidLeave {
                span: Some(DaySpan::WorkingDays { days }),
            } => {
                if days >= working_days {
                    return Err(format!(
                        "{} unpaid days cover the whole {}-day period",
                        days, working_days
                    ));
                }
                scale_or_confirm(
                    (working_days - days) / working_days,
                    format!(
                        "Deducted {} unpaid day(s) of {} working days",
                        days.normalize(),
                        working_days.normalize()
                    ),
                )
            }
            EdgeCaseSignal::NewHire { start: Some(date) } => {
                let days_in_month = days_in_period_month(draft, date)?;
                let paid_days = days_in_month - date.day + 1;
                scale_or_confirm(
                    Decimal::from(paid_days) / Decimal::from(days_in_month),
                    format!(
                        "Hired on {:02}/{:02}: paid {} of {} calendar days",
                        date.day, date.month, paid_days, days_in_month
                    ),
                )
            }
            EdgeCaseSignal::Departure { end: Some(date) } => {
                let days_in_month = days_in_period_month(draft, date)?;
                scale_or_confirm(
                    Decimal::from(date.day) / Decimal::from(days_in_month),
                    format!(
                        "Left on {:02}/{:02}: paid {} of {} calendar days",
                        date.day, date.month, date.day, days_in_month
                    ),
                )
            }
            EdgeCaseSignal::SalaryChange {
                new_amount: Some(amount),
                ..
            } => {
                if amount == draft.gross_salary {
                    Ok(Correction::Confirm {
                        reason: format!("Salary change to {} already reflected in gross", amount),
                    })
                } else {
                    Err(format!(
                        "stated salary {} differs from gross {}",
                        amount, draft.gross_salary
                    ))
                }
            }
            EdgeCaseSignal::SalaryChange {
                new_amount: None,
                percent: Some(percent),
            } => {
                let previous = evidence
                    .previous_gross_salary
                    .ok_or_else(|| "no previous gross to check the increase against".to_string())?;
                let expected = round_money(previous * (Decimal::ONE + percent / Decimal::ONE_HUNDRED));
                if (expected - draft.gross_salary).abs() <= Decimal::new(1, 2) {
                    Ok(Correction::Confirm {
                        reason: format!(
                            "Increase of {}% on {} matches gross {}",
                            percent.normalize(),
                            previous,
                            draft.gross_salary
                        ),
                    })
                } else {
                    Err(format!(
                        "a {}% increase on {} gives {}, not {}",
                        percent.normalize(),
                        previous,
                        expected,
                        draft.gross_salary
                    ))
                }
            }
            EdgeCaseSignal::SalaryChange {
                new_amount: None,
                percent: None,
            } => match evidence.previous_gross_salary {
                Some(previous) if previous > Decimal::ZERO && previous != draft.gross_salary => {
                    Ok(Correction::Confirm {
                        reason: format!(
                            "Salary change corroborated by gross moving from {} to {}",
                            previous, draft.gross_salary
                        ),
                    })
                }
                _ => Err("no amount stated and no change against the previous period".to_string()),
            },
            EdgeCaseSignal::Bonus { .. } => {
                Err("bonus amounts are entered by a payroll officer".to_string())
            }
            EdgeCaseSignal::Prorate { span: None } => {
                Err("no number of days worked stated".to_string())
            }
            EdgeCaseSignal::UnpaidLeave { span: None } => {
                Err("no number of unpaid days stated".to_string())
            }
            EdgeCaseSignal::NewHire { start: None } => Err("no start date stated".to_string()),
            EdgeCaseSignal::Departure { end: None } => Err("no end date stated".to_string()),
            EdgeCaseSignal::None => Err("nothing to correct".to_string()),
        }
    }

    /// Month-over-month checks against the previous gross salary.
    fn variance_findings(
        &self,
        gross: Decimal,
        explained: bool,
        evidence: &EdgeCaseEvidence,
    ) -> Vec<String> {
        let Some(previous) = evidence
            .previous_gross_salary
            .filter(|previous| *previous > Decimal::ZERO)
        else {
            return Vec::new();
        };

        let ratio = gross / previous;
        let mut findings = Vec::new();

        let tenfold = Decimal::new(95, 1)..=Decimal::new(105, 1);
        let tenth = Decimal::new(95, 3)..=Decimal::new(105, 3);
        if tenfold.contains(&ratio) || tenth.contains(&ratio) {
            findings.push(format!(
                "Gross {} is {}x the previous {}: probable data-entry error",
                gross,
                ratio.round_dp(2),
                previous
            ));
        } else if !explained && (ratio - Decimal::ONE).abs() > self.policy.anomaly_threshold {
            findings.push(format!(
                "Gross changed by {}% against the previous period with no explaining remark",
                ((ratio - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(1)
            ));
        }

        findings
    }
}

fn scale_or_confirm(ratio: Decimal, reason: String) -> Result<Correction, String> {
    if ratio >= Decimal::ONE {
        Ok(Correction::Confirm {
            reason: format!("{}; full period, no adjustment", reason),
        })
    } else {
        Ok(Correction::Scale {
            ratio: ratio.max(Decimal::ZERO),
            reason,
        })
    }
}

/// Calendar days in the payslip's month, provided the date falls in it.
fn days_in_period_month(draft: &PayslipResult, date: RemarkDate) -> Result<u32, String> {
    if date.month != draft.period.month {
        return Err(format!(
            "date {:02}/{:02} is outside period {}",
            date.day,
            date.month,
            draft.period.label()
        ));
    }
    let days = draft
        .period
        .days_in_month()
        .ok_or_else(|| format!("invalid period {}", draft.period.label()))?;
    if date.day > days {
        return Err(format!(
            "day {} does not exist in {}",
            date.day,
            draft.period.label()
        ));
    }
    Ok(days)
}

/// Calendar days in the payslip's month, provided a day range ending on
/// `to` fits in it.
fn days_in_period_range(draft: &PayslipResult, to: u32) -> Result<u32, String> {
    let days = draft
        .period
        .days_in_month()
        .ok_or_else(|| format!("invalid period {}", draft.period.label()))?;
    if to > days {
        return Err(format!(
            "day {} does not exist in {}",
            to,
            draft.period.label()
        ));
    }
    Ok(days)
}

/// Scales gross, every contribution and the withholding by `ratio`,
/// rounding each figure once, and logs what changed.
fn apply_scale(result: &mut PayslipResult, ratio: Decimal, reason: &str, confidence: Decimal) {
    let mut log = Vec::new();
    let mut record = |field: String, old_value: Decimal, new_value: Decimal| {
        if old_value != new_value {
            log.push(EdgeCaseModification {
                field,
                old_value,
                new_value,
                reason: reason.to_string(),
                confidence,
                automatic: true,
            });
        }
    };

    let old_net = result.net_salary;
    let old_cost = result.employer_total_cost;

    let gross = round_money(result.gross_salary * ratio);
    record("gross_salary".to_string(), result.gross_salary, gross);
    result.gross_salary = gross;

    for (code, contribution) in result.contribution_breakdown.categories.iter_mut() {
        let employee = round_money(contribution.employee_amount * ratio);
        let employer = round_money(contribution.employer_amount * ratio);
        record(
            format!("contribution.{}.employee_amount", code),
            contribution.employee_amount,
            employee,
        );
        record(
            format!("contribution.{}.employer_amount", code),
            contribution.employer_amount,
            employer,
        );
        contribution.base = round_money(contribution.base * ratio);
        contribution.employee_amount = employee;
        contribution.employer_amount = employer;
    }

    let tax = &mut result.tax;
    let old_tax = tax.total;
    tax.taxable_base = round_money(tax.taxable_base * ratio);
    tax.flat_levies = round_money(tax.flat_levies * ratio);
    tax.withholding = round_money(tax.withholding * ratio);
    tax.total = tax.flat_levies + tax.withholding;
    record("tax.total".to_string(), old_tax, tax.total);

    result.recompute_totals();
    record("net_salary".to_string(), old_net, result.net_salary);
    record(
        "employer_total_cost".to_string(),
        old_cost,
        result.employer_total_cost,
    );

    result.modifications.extend(log);
}
