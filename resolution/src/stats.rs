//! Aggregate statistics over a batch of resolution outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::ResolutionOutcome;
use crate::policy::ResolutionAction;

/// Summary of how a set of tickets was handled.
///
/// Distributions are keyed by the display name of the enum value so the
/// struct serializes to stable, readable JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total: usize,
    pub auto_resolved: usize,
    pub offered: usize,
    pub escalated: usize,
    /// Percentage of tickets closed automatically (0-100)
    pub auto_resolution_rate: f64,
    /// Mean classification confidence
    pub average_confidence: f64,
    pub by_tier: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub by_classification_method: BTreeMap<String, usize>,
    pub by_retrieval_method: BTreeMap<String, usize>,
}

impl ResolutionStats {
    /// Returns `ResolutionStats::default()` when `outcomes` is empty.
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        let mut confidence_sum = 0.0;
        for outcome in outcomes {
            match outcome.decision.action {
                ResolutionAction::AutoResolve => stats.auto_resolved += 1,
                ResolutionAction::OfferWithEscalation => stats.offered += 1,
                ResolutionAction::Escalate => stats.escalated += 1,
            }
            confidence_sum += outcome.classification.confidence;

            bump(&mut stats.by_tier, outcome.classification.tier);
            bump(&mut stats.by_category, outcome.classification.category);
            bump(&mut stats.by_classification_method, outcome.classification.method);
            bump(&mut stats.by_retrieval_method, outcome.retrieval.method);
        }

        let n = stats.total as f64;
        stats.auto_resolution_rate = stats.auto_resolved as f64 / n * 100.0;
        stats.average_confidence = confidence_sum / n;
        stats
    }
}

fn bump(map: &mut BTreeMap<String, usize>, key: impl std::fmt::Display) {
    *map.entry(key.to_string()).or_default() += 1;
}

impl std::fmt::Display for ResolutionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} tickets: {} auto-resolved ({:.1}%), {} offered, {} escalated",
            self.total,
            self.auto_resolved,
            self.auto_resolution_rate,
            self.offered,
            self.escalated
        )?;
        writeln!(f, "average confidence: {:.2}", self.average_confidence)?;
        for (name, map) in [
            ("tier", &self.by_tier),
            ("category", &self.by_category),
            ("classified by", &self.by_classification_method),
            ("retrieved by", &self.by_retrieval_method),
        ] {
            let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
            writeln!(f, "{name}: {}", parts.join(" "))?;
        }
        Ok(())
    }
}
