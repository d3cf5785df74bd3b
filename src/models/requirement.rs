//! Derived checklist items. Requirements are recomputed from session state,
//! never stored, so there is no partial-update path to drift out of sync.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementItem {
    /// Stable id within its checklist, e.g. `"{beneficiary_id}-nome"`.
    pub id: String,
    pub label: String,
    pub required: bool,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper: Option<String>,
}

impl RequirementItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, required: bool, done: bool) -> Self {
        RequirementItem {
            id: id.into(),
            label: label.into(),
            required,
            done,
            helper: None,
        }
    }

    pub fn with_helper(mut self, helper: impl Into<String>) -> Self {
        self.helper = Some(helper.into());
        self
    }

    /// A required item that is not yet satisfied.
    pub fn is_blocking(&self) -> bool {
        self.required && !self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_means_required_and_not_done() {
        assert!(RequirementItem::new("a", "A", true, false).is_blocking());
        assert!(!RequirementItem::new("b", "B", true, true).is_blocking());
        assert!(!RequirementItem::new("c", "C", false, false).is_blocking());
    }

    #[test]
    fn helper_is_optional_in_json() {
        let bare = RequirementItem::new("a", "A", true, false);
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("helper").is_none());

        let helped = bare.with_helper("only when applicable");
        let json = serde_json::to_value(&helped).unwrap();
        assert_eq!(json["helper"], "only when applicable");
    }
}
