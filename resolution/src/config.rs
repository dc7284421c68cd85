//! Engine configuration.
//!
//! Every threshold and message the engine applies lives here so it can be
//! tuned per deployment, but each value is applied the same way to every
//! ticket.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub retriever: RetrieverConfig,
    pub policy: PolicyConfig,
}

impl EngineConfig {
    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval(
            "classifier.confidence_threshold",
            self.classifier.confidence_threshold,
        )?;
        unit_interval(
            "retriever.relevance_threshold",
            self.retriever.relevance_threshold,
        )?;
        if self.retriever.top_k == 0 {
            return Err(ConfigError::Invalid {
                field: "retriever.top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        positive_timeout(
            "classifier.model_timeout_ms",
            self.classifier.model_timeout_ms,
        )?;
        positive_timeout("retriever.embed_timeout_ms", self.retriever.embed_timeout_ms)?;
        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

fn positive_timeout(field: &'static str, value: Option<u64>) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Invalid {
            field,
            reason: "must be positive when set".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model probability must be strictly above this to be accepted
    pub confidence_threshold: f64,
    /// Switch off the model tier even when a model is loaded
    pub model_enabled: bool,
    /// Deadline for one zero-shot call; unbounded when `None`
    pub model_timeout_ms: Option<u64>,
}

impl ClassifierConfig {
    pub fn model_timeout(&self) -> Option<Duration> {
        self.model_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            model_enabled: true,
            model_timeout_ms: None,
        }
    }
}

/// Retriever settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Cosine similarity must be strictly above this
    pub relevance_threshold: f64,
    /// Number of ranked candidates to keep
    pub top_k: usize,
    /// Switch off the semantic tier even when an embedder is loaded
    pub semantic_enabled: bool,
    /// Deadline for one embedding call; unbounded when `None`
    pub embed_timeout_ms: Option<u64>,
}

impl RetrieverConfig {
    pub fn embed_timeout(&self) -> Option<Duration> {
        self.embed_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.3,
            top_k: 3,
            semantic_enabled: true,
            embed_timeout_ms: None,
        }
    }
}

/// Fixed texts used when composing responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Used when retrieval found nothing
    pub generic_message: String,
    /// Appended to responses that leave the ticket open for a human
    pub escalation_offer: String,
    /// Sent when a ticket goes straight to a human
    pub acknowledgment: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            generic_message: "Thanks for reaching out. We couldn't find an article that \
                matches your request, but here are some general steps: check our help \
                center, make sure your app is up to date, and try signing out and back in."
                .to_string(),
            escalation_offer: "If this doesn't resolve your issue, reply to this ticket and \
                we'll escalate it to a human agent."
                .to_string(),
            acknowledgment: "We've received your ticket and passed it to our {team} team, \
                who will get back to you shortly."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.classifier.confidence_threshold, 0.7);
        assert_eq!(cfg.retriever.relevance_threshold, 0.3);
        assert_eq!(cfg.retriever.top_k, 3);
        assert!(cfg.classifier.model_timeout().is_none());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut cfg = EngineConfig::default();
        cfg.classifier.confidence_threshold = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "classifier.confidence_threshold", .. }
        ));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.retriever.top_k = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"retriever": {"top_k": 5}}"#).unwrap();
        assert_eq!(cfg.retriever.top_k, 5);
        assert_eq!(cfg.retriever.relevance_threshold, 0.3);
        assert_eq!(cfg.classifier, ClassifierConfig::default());
    }
}
