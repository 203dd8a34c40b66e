//! Request and reply classification.
//!
//! These predicates decide which prompt a message gets, whether a reply is
//! shown as day tables or as prose, and whether PDF export is offered.

use crate::pipeline::lines::{contains_day_token, is_table_line, split_cells};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_DIET_REQUEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)diet|meal\s+plan|nutrition").unwrap());

/// Which template a user message selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Possible conditions and prevention advice.
    Diagnosis,
    /// A seven-day meal plan.
    DietPlan,
}

impl RequestKind {
    /// `DietPlan` when the message mentions diet, meal plan or nutrition
    /// (case-insensitive), otherwise `Diagnosis`.
    pub fn from_message(message: &str) -> Self {
        if RE_DIET_REQUEST.is_match(message) {
            RequestKind::DietPlan
        } else {
            RequestKind::Diagnosis
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Diagnosis => write!(f, "diagnosis"),
            RequestKind::DietPlan => write!(f, "diet plan"),
        }
    }
}

/// Whether `text` should be rendered as day tables: it mentions a
/// `Day N` token somewhere and contains at least one pipe.
pub fn looks_like_day_plan(text: &str) -> bool {
    contains_day_token(text) && text.contains('|')
}

/// Whether `text` carries a meal table worth exporting: some pipe-delimited
/// line has a cell reading `Breakfast`.
pub fn is_exportable_plan(text: &str) -> bool {
    text.lines()
        .filter(|l| is_table_line(l))
        .any(|l| {
            split_cells(l)
                .iter()
                .any(|c| c.eq_ignore_ascii_case("breakfast"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diet_keywords_select_diet_plan() {
        for msg in [
            "diet plan",
            "Can you give me a DIET?",
            "I need a meal plan for diabetes",
            "nutrition advice please",
        ] {
            assert_eq!(RequestKind::from_message(msg), RequestKind::DietPlan, "{msg}");
        }
    }

    #[test]
    fn other_messages_select_diagnosis() {
        for msg in ["I have a headache", "fever and chills", "my meal was bad", ""] {
            assert_eq!(RequestKind::from_message(msg), RequestKind::Diagnosis, "{msg}");
        }
    }

    #[test]
    fn day_plan_needs_label_and_pipe() {
        assert!(looks_like_day_plan("Day 1\n| Meal | Food |"));
        assert!(looks_like_day_plan("**day 3**: | a |"));
        assert!(!looks_like_day_plan("Day 1: rest and drink water"));
        assert!(!looks_like_day_plan("| Meal | Food |"));
    }

    #[test]
    fn exportable_when_breakfast_cell_present() {
        assert!(is_exportable_plan("| Meal | Food |\n|---|---|\n| Breakfast | Oats |"));
        assert!(is_exportable_plan("| Day | breakfast | Lunch |"));
        assert!(!is_exportable_plan("Have breakfast early."));
        assert!(!is_exportable_plan("| Meal | Food |\n| Lunch | Rice |"));
    }

    #[test]
    fn kind_display() {
        assert_eq!(RequestKind::DietPlan.to_string(), "diet plan");
        assert_eq!(RequestKind::Diagnosis.to_string(), "diagnosis");
    }
}
