//! Error types for the resolution engine.
//!
//! Nothing in here escapes `classify`, `retrieve` or `decide`: strategy
//! errors are absorbed by the fallback chain. The remaining types cover
//! startup (knowledge base loading, configuration) and model providers.

use std::path::PathBuf;
use thiserror::Error;

/// Why a strategy in a fallback chain did not produce a result.
///
/// Every variant means the same thing to the chain: try the next tier.
/// The distinction only matters for logs and tests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    /// Required resource (model, embeddings, corpus) was never loaded
    #[error("{resource} is not loaded")]
    ResourceUnavailable { resource: &'static str },

    /// Strategy ran but found nothing usable
    #[error("no match")]
    NoMatch,

    /// Best candidate did not clear the configured threshold
    #[error("best score {score:.3} is not above threshold {threshold:.3}")]
    BelowThreshold { score: f64, threshold: f64 },

    /// Input had no content to work on
    #[error("input is empty")]
    EmptyInput,

    /// Model provider call failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Model call exceeded its deadline
    #[error("timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Strategy panicked; caught at the chain boundary
    #[error("strategy fault: {0}")]
    Fault(String),
}

impl StrategyError {
    /// Whether this fall-through was caused by something going wrong, as
    /// opposed to the strategy simply having nothing to offer.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Timeout { .. } | Self::Fault(_)
        )
    }
}

/// Errors reported by model provider capabilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Errors while loading the knowledge base at startup.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate knowledge document id: {0}")]
    DuplicateId(String),
}

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
