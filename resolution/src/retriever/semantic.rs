//! Embedding similarity search.

use std::sync::Arc;

use crate::config::RetrieverConfig;
use crate::error::StrategyError;
use crate::knowledge::KnowledgeBase;
use crate::provider::{call_with_deadline, cosine_similarity, Embedder};
use crate::types::{RankedDocument, Ranking};

use super::top_k;

/// Rank documents by cosine similarity between the query embedding and each
/// document's precomputed embedding.
///
/// Documents without an embedding, or whose embedding has a different
/// dimension than the query's, are skipped. Only scores strictly above
/// `relevance_threshold` are ranked.
pub(crate) fn search(
    embedder: Option<&Arc<dyn Embedder>>,
    query: &str,
    corpus: &KnowledgeBase,
    config: &RetrieverConfig,
) -> Result<Ranking, StrategyError> {
    let embedder = embedder.cloned().ok_or(StrategyError::ResourceUnavailable {
        resource: "embedding model",
    })?;
    if !corpus.has_embeddings() {
        return Err(StrategyError::ResourceUnavailable {
            resource: "document embeddings",
        });
    }
    if query.is_empty() {
        return Err(StrategyError::EmptyInput);
    }

    let owned_query = query.to_string();
    let query_vector = call_with_deadline(config.embed_timeout(), move || {
        embedder.embed(&owned_query)
    })?;

    let threshold = config.relevance_threshold;
    let mut best_rejected: Option<f64> = None;
    let mut candidates = Vec::new();

    for doc in corpus.documents() {
        let Some(doc_vector) = doc.precomputed_embedding.as_deref() else {
            continue;
        };
        if doc_vector.len() != query_vector.len() {
            continue;
        }
        let score = f64::from(cosine_similarity(&query_vector, doc_vector));
        if score > threshold {
            candidates.push(RankedDocument {
                document: doc.clone(),
                score,
            });
        } else if best_rejected.map_or(true, |b| score > b) {
            best_rejected = Some(score);
        }
    }

    Ranking::new(top_k(candidates, config.top_k)).ok_or(match best_rejected {
        Some(score) => StrategyError::BelowThreshold { score, threshold },
        None => StrategyError::NoMatch,
    })
}
