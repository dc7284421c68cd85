//! Startup wiring: corpus, model capabilities and the engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use resolution::{
    Embedder, EngineConfig, HashingEmbedder, KnowledgeBase, ModelCapabilities, ResolutionEngine,
    ZeroShotClassifier,
};
use tracing::{info, warn};

use crate::config::{DeskConfig, ProviderSettings};
use crate::providers::{HttpEmbedder, HttpZeroShotClassifier};

/// Load the knowledge base named by the config.
pub fn load_corpus(config: &DeskConfig) -> Result<KnowledgeBase> {
    match &config.kb_json {
        Some(path) => KnowledgeBase::load_json(path)
            .with_context(|| format!("Failed to load knowledge base {}", path.display())),
        None => KnowledgeBase::load_dir(&config.kb_dir).with_context(|| {
            format!("Failed to load knowledge base {}", config.kb_dir.display())
        }),
    }
}

/// HTTP timeout for a provider, never longer than the engine's deadline
/// for that provider. A call the engine stopped waiting for keeps its
/// helper thread until the request itself gives up.
pub fn client_timeout(settings: &ProviderSettings, deadline: Option<Duration>) -> Duration {
    let timeout = Duration::from_secs(settings.request_timeout_secs.max(1));
    deadline.map_or(timeout, |d| timeout.min(d))
}

/// Build the configured model capabilities. A provider that cannot be
/// constructed is left out with a warning; the engine falls back without
/// it.
pub fn capabilities(settings: &ProviderSettings, engine: &EngineConfig) -> ModelCapabilities {
    let mut caps = ModelCapabilities::none();

    if let Some(url) = &settings.zero_shot_url {
        let timeout = client_timeout(settings, engine.classifier.model_timeout());
        match HttpZeroShotClassifier::new(url.as_str(), settings.api_key.clone(), timeout) {
            Ok(client) => {
                let client: Arc<dyn ZeroShotClassifier> = Arc::new(client);
                caps = caps.with_zero_shot(client);
            }
            Err(e) => warn!(error = %e, "Zero-shot model unavailable"),
        }
    }

    match &settings.embedding_url {
        Some(url) => match HttpEmbedder::new(
            url,
            settings.embedding_model.as_str(),
            settings.api_key.clone(),
            client_timeout(settings, engine.retriever.embed_timeout()),
        ) {
            Ok(client) => {
                let client: Arc<dyn Embedder> = Arc::new(client);
                caps = caps.with_embedder(client);
            }
            Err(e) => warn!(error = %e, "Embedding model unavailable"),
        },
        None if settings.local_embeddings => {
            caps = caps.with_embedder(Arc::new(HashingEmbedder::default()));
        }
        None => {}
    }

    caps
}

/// Load everything and build a shareable engine.
///
/// Documents without an embedding are embedded once here, before the
/// corpus becomes read-only.
pub fn build_engine(config: &DeskConfig) -> Result<Arc<ResolutionEngine>> {
    let mut corpus = load_corpus(config)?;
    let caps = capabilities(&config.providers, &config.engine);

    if let Some(embedder) = &caps.embedder {
        let embedded = corpus.embed_missing(&**embedder);
        info!(embedded, documents = corpus.len(), "Embedded knowledge base");
    }

    let engine = ResolutionEngine::new(config.engine.clone(), caps, Arc::new(corpus))
        .context("Invalid engine configuration")?;
    Ok(Arc::new(engine))
}
