//! Resolution engine facade
//!
//! Wires classifier, retriever and policy around the process-wide state
//! (models and knowledge base) loaded at startup:
//!
//! ```text
//! Ticket ─┬─ classify ──► ClassificationResult ─┐
//!         └─ retrieve ──► RetrievalResult ──────┴─► decide ──► ResolutionDecision
//! ```
//!
//! The engine is `Send + Sync` and holds no per-ticket state; share it
//! behind an `Arc` and call [`ResolutionEngine::resolve`] from any number
//! of threads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::Classifier;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::knowledge::KnowledgeBase;
use crate::policy::{ResolutionDecision, ResolutionPolicy};
use crate::provider::ModelCapabilities;
use crate::retriever::Retriever;
use crate::types::{ClassificationResult, RetrievalResult, Ticket};

/// Everything decided about one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub ticket_id: String,
    pub classification: ClassificationResult,
    pub retrieval: RetrievalResult,
    pub decision: ResolutionDecision,
    pub decided_at: DateTime<Utc>,
}

impl ResolutionOutcome {
    /// Private note for escalated tickets, `None` otherwise.
    pub fn escalation_note(&self) -> Option<String> {
        self.decision
            .is_escalation()
            .then(|| self.decision.escalation_note(&self.classification))
    }
}

pub struct ResolutionEngine {
    classifier: Classifier,
    retriever: Retriever,
    policy: ResolutionPolicy,
    corpus: Arc<KnowledgeBase>,
}

impl ResolutionEngine {
    /// Build an engine. Fails only on invalid configuration.
    pub fn new(
        config: EngineConfig,
        capabilities: ModelCapabilities,
        corpus: Arc<KnowledgeBase>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            zero_shot = capabilities.zero_shot.is_some(),
            embedder = capabilities.embedder.is_some(),
            documents = corpus.len(),
            embedded = corpus.has_embeddings(),
            "Resolution engine ready"
        );
        Ok(Self {
            classifier: Classifier::new(config.classifier, capabilities.zero_shot),
            retriever: Retriever::new(config.retriever, capabilities.embedder),
            policy: ResolutionPolicy::new(config.policy),
            corpus,
        })
    }

    pub fn corpus(&self) -> &KnowledgeBase {
        &self.corpus
    }

    pub fn classify(&self, ticket: &Ticket) -> ClassificationResult {
        self.classifier.classify(ticket)
    }

    /// Retrieve against the engine's knowledge base.
    pub fn retrieve(&self, query: &str) -> RetrievalResult {
        self.retriever.retrieve(query, &self.corpus)
    }

    pub fn decide(
        &self,
        classification: &ClassificationResult,
        retrieval: &RetrievalResult,
    ) -> ResolutionDecision {
        self.policy.decide(classification, retrieval)
    }

    /// Run classify, retrieve and decide for one ticket.
    pub fn resolve(&self, ticket: &Ticket) -> ResolutionOutcome {
        let classification = self.classify(ticket);
        let retrieval = self.retrieve(&ticket.text());
        let decision = self.decide(&classification, &retrieval);

        info!(
            ticket_id = %ticket.id,
            tier = %classification.tier,
            category = %classification.category,
            classified_by = %classification.method,
            retrieved_by = %retrieval.method,
            action = %decision.action,
            "Resolved ticket"
        );

        ResolutionOutcome {
            ticket_id: ticket.id.clone(),
            classification,
            retrieval,
            decision,
            decided_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("documents", &self.corpus.len())
            .field("classifier_tiers", &self.classifier.chain().tiers())
            .field("retriever_tiers", &self.retriever.chain().tiers())
            .finish()
    }
}
