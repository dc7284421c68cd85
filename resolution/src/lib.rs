//! Ticket Resolution Engine
//!
//! Decides, for an incoming support ticket, how complex it is, which
//! category it belongs to, and whether a knowledge-base answer can be sent
//! automatically or a human must take over.
//!
//! # Pipeline
//!
//! - [`Classifier`]: zero-shot model → keyword rules → default (Complex)
//! - [`Retriever`]: embedding search → keyword overlap → default (no document)
//! - [`ResolutionPolicy`]: fixed routing table over (tier, retrieval)
//!
//! Classifier and retriever each run a [`FallbackChain`] whose last tier
//! cannot fail, so none of the public operations return an error for any
//! input. Model capabilities are optional; with none loaded the engine runs
//! on keyword rules alone.
//!
//! # Usage
//!
//! ```rust,ignore
//! let corpus = Arc::new(KnowledgeBase::load_dir(Path::new("knowledge_base"))?);
//! let engine = ResolutionEngine::new(EngineConfig::default(), ModelCapabilities::none(), corpus)?;
//! let outcome = engine.resolve(&Ticket::new("42", "Password reset", "link expired"));
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod policy;
pub mod provider;
pub mod resilience;
pub mod retriever;
pub mod stats;
pub mod text;
pub mod types;

pub use classifier::Classifier;
pub use config::{ClassifierConfig, EngineConfig, PolicyConfig, RetrieverConfig};
pub use engine::{ResolutionEngine, ResolutionOutcome};
pub use error::{ConfigError, KnowledgeError, ProviderError, StrategyError};
pub use knowledge::KnowledgeBase;
pub use policy::{ResolutionAction, ResolutionDecision, ResolutionPolicy};
pub use provider::{
    cosine_similarity, Embedder, HashingEmbedder, ModelCapabilities, ZeroShotClassifier,
    ZeroShotLabel,
};
pub use resilience::{ChainOutcome, DegradationLevel, FallbackChain};
pub use retriever::Retriever;
pub use stats::ResolutionStats;
pub use types::{
    Category, ClassificationMethod, ClassificationResult, KnowledgeDocument, RankedDocument,
    Ranking, RetrievalMethod, RetrievalResult, Ticket, Tier,
};
