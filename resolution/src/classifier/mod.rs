//! Ticket classifier
//!
//! Decides tier and category for a ticket by running a fallback chain:
//!
//! ```text
//! Tier     | Needs                    | Accepts when
//! ---------|--------------------------|---------------------------------------
//! Model    | zero-shot model loaded   | known label, probability > threshold
//! Keyword  | -                        | at least one keyword matched
//! Default  | -                        | always: Complex / Other / 0.0
//! ```
//!
//! Unmatched and low-confidence tickets end up Complex, i.e. with a human.

pub mod keywords;
pub mod labels;

use std::sync::Arc;

use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::{ProviderError, StrategyError};
use crate::provider::{call_with_deadline, ZeroShotClassifier};
use crate::resilience::{ChainOutcome, FallbackChain};
use crate::text::tokenize;
use crate::types::{ClassificationMethod, ClassificationResult, Ticket};

pub use keywords::{KeywordMatch, KeywordRule, KEYWORD_RULES, URGENCY_KEYWORDS};
pub use labels::{ModelLabel, MODEL_LABELS};

/// Classifies tickets. Cheap to share across threads.
pub struct Classifier {
    config: ClassifierConfig,
    zero_shot: Option<Arc<dyn ZeroShotClassifier>>,
    labels: Arc<Vec<String>>,
    chain: FallbackChain<ClassificationMethod>,
}

impl Classifier {
    /// Build a classifier. `zero_shot = None` means no model is loaded.
    pub fn new(config: ClassifierConfig, zero_shot: Option<Arc<dyn ZeroShotClassifier>>) -> Self {
        let mut chain = FallbackChain::new("classifier", ClassificationMethod::Default)
            .add_tier(ClassificationMethod::Model)
            .add_tier(ClassificationMethod::Keyword);
        if !config.model_enabled {
            chain = chain.without_tier(ClassificationMethod::Model);
        }
        Self {
            config,
            zero_shot,
            labels: Arc::new(labels::label_names()),
            chain,
        }
    }

    /// Keyword rules and default only.
    pub fn keyword_only(config: ClassifierConfig) -> Self {
        Self::new(config, None)
    }

    pub fn chain(&self) -> &FallbackChain<ClassificationMethod> {
        &self.chain
    }

    /// Classify a ticket. Never fails.
    pub fn classify(&self, ticket: &Ticket) -> ClassificationResult {
        self.classify_detailed(ticket).value
    }

    /// Classify and keep the chain metadata (served-by tier, warnings).
    pub fn classify_detailed(
        &self,
        ticket: &Ticket,
    ) -> ChainOutcome<ClassificationResult, ClassificationMethod> {
        let text = ticket.text();
        let outcome = self.chain.execute(
            |method| match method {
                ClassificationMethod::Model => self.classify_with_model(&text),
                ClassificationMethod::Keyword => classify_with_keywords(&text),
                ClassificationMethod::Default => Ok(ClassificationResult::fallback()),
            },
            ClassificationResult::fallback,
        );
        debug!(
            ticket_id = %ticket.id,
            tier = %outcome.value.tier,
            category = %outcome.value.category,
            confidence = outcome.value.confidence,
            method = %outcome.served_by,
            "Classified ticket"
        );
        outcome
    }

    fn classify_with_model(&self, text: &str) -> Result<ClassificationResult, StrategyError> {
        let model = self
            .zero_shot
            .clone()
            .ok_or(StrategyError::ResourceUnavailable {
                resource: "zero-shot model",
            })?;
        if text.is_empty() {
            return Err(StrategyError::EmptyInput);
        }

        let owned_text = text.to_string();
        let labels = Arc::clone(&self.labels);
        let answer = call_with_deadline(self.config.model_timeout(), move || {
            model.classify_text(&owned_text, &labels)
        })?;

        let label = labels::lookup(&answer.label).ok_or_else(|| {
            StrategyError::Provider(ProviderError::InvalidResponse(format!(
                "unknown label '{}'",
                answer.label
            )))
        })?;

        let threshold = self.config.confidence_threshold;
        // NaN fails this check too
        if !(answer.probability > threshold) {
            return Err(StrategyError::BelowThreshold {
                score: answer.probability,
                threshold,
            });
        }

        Ok(ClassificationResult::model(
            label.tier,
            label.category,
            answer.probability,
        ))
    }
}

fn classify_with_keywords(text: &str) -> Result<ClassificationResult, StrategyError> {
    let m = keywords::match_rules(&tokenize(text)).ok_or(StrategyError::NoMatch)?;
    Ok(ClassificationResult::keyword(
        m.tier,
        m.category,
        m.confidence,
        m.matched,
    ))
}
