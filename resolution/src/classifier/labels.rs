//! Fixed label set offered to the zero-shot model.

use crate::types::{Category, Tier};

/// A candidate label and the (tier, category) it stands for.
#[derive(Debug, Clone, Copy)]
pub struct ModelLabel {
    pub label: &'static str,
    pub tier: Tier,
    pub category: Category,
}

pub const MODEL_LABELS: &[ModelLabel] = &[
    ModelLabel {
        label: "account access or password problem",
        tier: Tier::Tier1,
        category: Category::Auth,
    },
    ModelLabel {
        label: "how-to or general usage question",
        tier: Tier::Tier1,
        category: Category::Other,
    },
    ModelLabel {
        label: "billing, payment or subscription issue",
        tier: Tier::Tier2,
        category: Category::Billing,
    },
    ModelLabel {
        label: "feature request or product suggestion",
        tier: Tier::Tier2,
        category: Category::FeatureRequest,
    },
    ModelLabel {
        label: "technical error, crash or outage",
        tier: Tier::Complex,
        category: Category::Technical,
    },
    ModelLabel {
        label: "security incident or account compromise",
        tier: Tier::Complex,
        category: Category::Security,
    },
];

/// Look up a label returned by the model. Comparison ignores case and
/// surrounding whitespace.
pub fn lookup(label: &str) -> Option<&'static ModelLabel> {
    let wanted = label.trim();
    MODEL_LABELS
        .iter()
        .find(|l| l.label.eq_ignore_ascii_case(wanted))
}

/// Label strings in the order they are offered to the model.
pub fn label_names() -> Vec<String> {
    MODEL_LABELS.iter().map(|l| l.label.to_string()).collect()
}
