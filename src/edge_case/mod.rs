//! Edge-case detection and resolution.
//!
//! [`RemarkClassifier`] turns an operator remark into a typed
//! [`EdgeCaseSignal`] with a confidence; [`EdgeCaseAgent`] decides whether
//! that signal corrects the draft payslip automatically, sends it to manual
//! review, or is ignored.

mod agent;
mod classifier;

pub use agent::{EdgeCaseAgent, EdgeCaseEvidence};
pub use classifier::{
    CAPTURED_CONFIDENCE, Capture, Classification, DaySpan, EdgeCaseSignal, KEYWORD_CONFIDENCE,
    RULES, RemarkClassifier, RemarkDate, Specificity,
};
