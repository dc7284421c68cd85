//! Resolution policy
//!
//! Pure routing from (classification, retrieval) to an action and the text
//! sent to the customer. Rows are evaluated top to bottom:
//!
//! ```text
//! Tier     | Retrieval   | Action                | Response                         | Close
//! ---------|-------------|-----------------------|----------------------------------|------
//! Tier 1   | found       | AutoResolve           | article body                     | yes
//! Tier 1   | default     | OfferWithEscalation   | generic message + offer          | no
//! Tier 2   | any         | OfferWithEscalation   | article body or generic + offer  | no
//! Complex  | any         | Escalate              | acknowledgment                   | no
//! ```
//!
//! Category never changes the row; it only picks the team.

pub mod templates;

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::types::{
    Category, ClassificationMethod, ClassificationResult, RetrievalMethod, RetrievalResult, Tier,
};

/// What to do with a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    /// Reply with the article and close the ticket
    AutoResolve,
    /// Reply, keep the ticket open and offer a human
    OfferWithEscalation,
    /// Hand to a human agent
    Escalate,
}

impl std::fmt::Display for ResolutionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoResolve => write!(f, "auto_resolve"),
            Self::OfferWithEscalation => write!(f, "offer_with_escalation"),
            Self::Escalate => write!(f, "escalate"),
        }
    }
}

/// Routing decision handed to the ticketing backend client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDecision {
    pub action: ResolutionAction,
    pub response_text: String,
    pub should_close_ticket: bool,
    pub tier: Tier,
    pub category: Category,
    /// Agent team for assignment, derived from category
    pub team: String,
    /// One-line explanation for the private note
    pub rationale: String,
}

impl ResolutionDecision {
    /// Private note for the backend to attach when escalating.
    pub fn escalation_note(&self, classification: &ClassificationResult) -> String {
        templates::escalation_note(
            &self.rationale,
            classification,
            &self.team,
            &self.response_text,
        )
    }

    pub fn is_escalation(&self) -> bool {
        self.action == ResolutionAction::Escalate
    }
}

/// The routing table plus the texts it composes with.
#[derive(Debug, Clone, Default)]
pub struct ResolutionPolicy {
    config: PolicyConfig,
}

impl ResolutionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide what to do with a classified ticket. Total and deterministic.
    pub fn decide(
        &self,
        classification: &ClassificationResult,
        retrieval: &RetrievalResult,
    ) -> ResolutionDecision {
        let found = retrieval.method != RetrievalMethod::Default;
        let document = retrieval.document.as_ref();
        let team = classification.category.team();

        let (action, response_text, rationale) = match (classification.tier, found) {
            (Tier::Tier1, true) => (
                ResolutionAction::AutoResolve,
                templates::article_or_generic(document, &self.config),
                format!(
                    "tier 1 {} ticket answered from '{}' ({} retrieval, score {:.2})",
                    classification.category.label(),
                    document.map(|d| d.title.as_str()).unwrap_or("-"),
                    retrieval.method,
                    retrieval.score
                ),
            ),
            (Tier::Tier1, false) => (
                ResolutionAction::OfferWithEscalation,
                templates::with_escalation_offer(&self.config.generic_message, &self.config),
                format!(
                    "tier 1 {} ticket with no matching article",
                    classification.category.label()
                ),
            ),
            (Tier::Tier2, _) => (
                ResolutionAction::OfferWithEscalation,
                templates::with_escalation_offer(
                    &templates::article_or_generic(document, &self.config),
                    &self.config,
                ),
                format!(
                    "tier 2 {} ticket; answer offered, human on request",
                    classification.category.label()
                ),
            ),
            (Tier::Complex, _) => (
                ResolutionAction::Escalate,
                templates::acknowledgment(team, &self.config),
                complex_rationale(classification),
            ),
        };

        ResolutionDecision {
            should_close_ticket: action == ResolutionAction::AutoResolve,
            action,
            response_text,
            tier: classification.tier,
            category: classification.category,
            team: team.to_string(),
            rationale,
        }
    }
}

fn complex_rationale(classification: &ClassificationResult) -> String {
    match classification.method {
        ClassificationMethod::Default => {
            "no confident classification; defaulting to a human".to_string()
        }
        _ => format!(
            "complex {} ticket ({:.0}% {} confidence)",
            classification.category.label(),
            classification.confidence * 100.0,
            classification.method
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnowledgeDocument, RankedDocument, Ranking};

    fn found(method: RetrievalMethod) -> RetrievalResult {
        let ranking = Ranking::new(vec![RankedDocument {
            document: KnowledgeDocument::new("kb-1", "Password reset", "Use the reset link."),
            score: 0.8,
        }])
        .unwrap();
        RetrievalResult::found(method, ranking)
    }

    fn classified(tier: Tier, category: Category) -> ClassificationResult {
        ClassificationResult::keyword(tier, category, 0.7, vec![])
    }

    #[test]
    fn test_tier1_with_article_auto_resolves() {
        let d = ResolutionPolicy::default().decide(
            &classified(Tier::Tier1, Category::Auth),
            &found(RetrievalMethod::Semantic),
        );
        assert_eq!(d.action, ResolutionAction::AutoResolve);
        assert_eq!(d.response_text, "Use the reset link.");
        assert!(d.should_close_ticket);
        assert_eq!(d.team, "accounts");
    }

    #[test]
    fn test_tier1_without_article_offers_escalation() {
        let policy = ResolutionPolicy::default();
        let d = policy.decide(
            &classified(Tier::Tier1, Category::Other),
            &RetrievalResult::fallback(),
        );
        assert_eq!(d.action, ResolutionAction::OfferWithEscalation);
        assert!(!d.should_close_ticket);
        assert!(d.response_text.starts_with(&policy.config().generic_message));
        assert!(d.response_text.ends_with(&policy.config().escalation_offer));
    }

    #[test]
    fn test_tier2_uses_article_or_generic() {
        let policy = ResolutionPolicy::default();
        let with_doc = policy.decide(
            &classified(Tier::Tier2, Category::Billing),
            &found(RetrievalMethod::Keyword),
        );
        assert_eq!(with_doc.action, ResolutionAction::OfferWithEscalation);
        assert!(with_doc.response_text.starts_with("Use the reset link.\n\n"));

        let without = policy.decide(
            &classified(Tier::Tier2, Category::Billing),
            &RetrievalResult::fallback(),
        );
        assert!(without.response_text.starts_with(&policy.config().generic_message));
        assert!(!without.should_close_ticket);
    }

    #[test]
    fn test_complex_escalates_regardless_of_retrieval() {
        let policy = ResolutionPolicy::default();
        for retrieval in [found(RetrievalMethod::Semantic), RetrievalResult::fallback()] {
            let d = policy.decide(&ClassificationResult::fallback(), &retrieval);
            assert_eq!(d.action, ResolutionAction::Escalate);
            assert!(!d.should_close_ticket);
            assert!(d.response_text.contains("general-support"));
            assert!(d.rationale.contains("no confident classification"));
        }
    }

    #[test]
    fn test_table_is_total() {
        let policy = ResolutionPolicy::default();
        let retrievals = [
            found(RetrievalMethod::Semantic),
            found(RetrievalMethod::Keyword),
            RetrievalResult::fallback(),
        ];
        for tier in Tier::ALL {
            for category in Category::PRIORITY {
                for retrieval in &retrievals {
                    let c = classified(tier, category);
                    let d = policy.decide(&c, retrieval);
                    assert_eq!(d, policy.decide(&c, retrieval));
                    assert_eq!(d.should_close_ticket, d.action == ResolutionAction::AutoResolve);
                    assert_eq!(d.category, category);
                    assert_eq!(d.tier, tier);
                    assert!(!d.response_text.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_escalation_note() {
        let c = classified(Tier::Complex, Category::Security);
        let d = ResolutionPolicy::default().decide(&c, &RetrievalResult::fallback());
        let note = d.escalation_note(&c);
        assert!(note.contains("Team: security"));
        assert!(note.contains(&d.response_text));
        assert!(d.is_escalation());
    }
}
