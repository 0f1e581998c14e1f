//! Edge-case categories shared by the remark classifier and the agent.

use serde::{Deserialize, Serialize};

/// The kinds of payroll edge case a remark can signal.
///
/// The declaration order is the tie-break priority used when two categories
/// match a remark with equal specificity: departures and hires are
/// higher-consequence misses than bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCaseCategory {
    /// Employee leaves during the period.
    Departure,
    /// Employee joins during the period.
    NewHire,
    /// Base salary changed.
    SalaryChange,
    /// One-off bonus or thirteenth month.
    Bonus,
    /// Unpaid leave or unpaid sick leave.
    UnpaidLeave,
    /// Salary must be prorated over part of the period.
    Prorate,
    /// No edge case.
    None,
}

impl EdgeCaseCategory {
    /// All categories in priority order.
    pub const PRIORITY: [EdgeCaseCategory; 7] = [
        EdgeCaseCategory::Departure,
        EdgeCaseCategory::NewHire,
        EdgeCaseCategory::SalaryChange,
        EdgeCaseCategory::Bonus,
        EdgeCaseCategory::UnpaidLeave,
        EdgeCaseCategory::Prorate,
        EdgeCaseCategory::None,
    ];

    /// Position in the tie-break order; lower wins.
    pub fn priority(self) -> usize {
        self as usize
    }

    /// The snake_case name used in serialized results.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeCaseCategory::Departure => "departure",
            EdgeCaseCategory::NewHire => "new_hire",
            EdgeCaseCategory::SalaryChange => "salary_change",
            EdgeCaseCategory::Bonus => "bonus",
            EdgeCaseCategory::UnpaidLeave => "unpaid_leave",
            EdgeCaseCategory::Prorate => "prorate",
            EdgeCaseCategory::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_follows_declaration_order() {
        for (index, category) in EdgeCaseCategory::PRIORITY.iter().enumerate() {
            assert_eq!(category.priority(), index);
        }
        assert!(EdgeCaseCategory::Departure.priority() < EdgeCaseCategory::NewHire.priority());
        assert!(EdgeCaseCategory::Bonus.priority() < EdgeCaseCategory::Prorate.priority());
    }

    #[test]
    fn test_serialization_matches_as_str() {
        for category in EdgeCaseCategory::PRIORITY {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
