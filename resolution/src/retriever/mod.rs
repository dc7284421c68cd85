//! Knowledge retriever
//!
//! Finds the knowledge-base documents most relevant to a query:
//!
//! ```text
//! Tier      | Needs                                  | Accepts when
//! ----------|----------------------------------------|------------------------------
//! Semantic  | embedder loaded, corpus has embeddings | cosine > relevance_threshold
//! Keyword   | non-empty corpus                       | word overlap > 0
//! Default   | -                                      | always: no document, score 0
//! ```
//!
//! Semantic and keyword tiers return up to `top_k` candidates, score
//! descending, ties in corpus order.

pub mod lexical;
pub mod semantic;

use std::sync::Arc;

use tracing::debug;

use crate::config::RetrieverConfig;
use crate::knowledge::KnowledgeBase;
use crate::provider::Embedder;
use crate::resilience::{ChainOutcome, FallbackChain};
use crate::text::sanitize_text;
use crate::types::{RankedDocument, RetrievalMethod, RetrievalResult};

/// Retrieves documents from a corpus. Holds no corpus state of its own.
pub struct Retriever {
    config: RetrieverConfig,
    embedder: Option<Arc<dyn Embedder>>,
    chain: FallbackChain<RetrievalMethod>,
}

impl Retriever {
    pub fn new(config: RetrieverConfig, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let mut chain = FallbackChain::new("retriever", RetrievalMethod::Default)
            .add_tier(RetrievalMethod::Semantic)
            .add_tier(RetrievalMethod::Keyword);
        if !config.semantic_enabled {
            chain = chain.without_tier(RetrievalMethod::Semantic);
        }
        Self {
            config,
            embedder,
            chain,
        }
    }

    pub fn chain(&self) -> &FallbackChain<RetrievalMethod> {
        &self.chain
    }

    /// Best matches for `query` in `corpus`. Never fails.
    pub fn retrieve(&self, query: &str, corpus: &KnowledgeBase) -> RetrievalResult {
        self.retrieve_detailed(query, corpus).value
    }

    pub fn retrieve_detailed(
        &self,
        query: &str,
        corpus: &KnowledgeBase,
    ) -> ChainOutcome<RetrievalResult, RetrievalMethod> {
        let query = sanitize_text(query);
        let outcome = self.chain.execute(
            |method| {
                let ranking = match method {
                    RetrievalMethod::Semantic => {
                        semantic::search(self.embedder.as_ref(), &query, corpus, &self.config)?
                    }
                    RetrievalMethod::Keyword => {
                        lexical::search(&query, corpus, self.config.top_k)?
                    }
                    RetrievalMethod::Default => return Ok(RetrievalResult::fallback()),
                };
                Ok(RetrievalResult::found(method, ranking))
            },
            RetrievalResult::fallback,
        );
        debug!(
            method = %outcome.served_by,
            document = outcome.value.document.as_ref().map(|d| d.id.as_str()).unwrap_or("-"),
            score = outcome.value.score,
            candidates = outcome.value.ranked.len(),
            "Retrieved knowledge"
        );
        outcome
    }
}

/// Stable sort by score descending, then truncate.
pub(crate) fn top_k(mut candidates: Vec<RankedDocument>, k: usize) -> Vec<RankedDocument> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{HashingEmbedder, MockEmbedder};
    use crate::types::KnowledgeDocument;

    fn corpus() -> KnowledgeBase {
        KnowledgeBase::from_documents(vec![
            KnowledgeDocument::new(
                "password_reset.txt",
                "password reset",
                "Open the reset link from your email and choose a new password.",
            ),
            KnowledgeDocument::new(
                "billing.txt",
                "billing",
                "Duplicate charges are refunded within five business days.",
            ),
        ])
        .unwrap()
    }

    fn embedded_corpus() -> KnowledgeBase {
        let mut kb = corpus();
        kb.embed_missing(&HashingEmbedder::default());
        kb
    }

    #[test]
    fn test_semantic_tier_used_when_available() {
        let r = Retriever::new(
            RetrieverConfig::default(),
            Some(Arc::new(HashingEmbedder::default())),
        );
        let result = r.retrieve("password reset link", &embedded_corpus());
        assert_eq!(result.method, RetrievalMethod::Semantic);
        assert_eq!(result.document.unwrap().id, "password_reset.txt");
        assert!(result.score > 0.3);
    }

    #[test]
    fn test_keyword_tier_without_embedder() {
        let r = Retriever::new(RetrieverConfig::default(), None);
        let outcome = r.retrieve_detailed("charged twice, need a refund for the charges", &corpus());
        assert_eq!(outcome.served_by, RetrievalMethod::Keyword);
        assert_eq!(outcome.value.document.unwrap().id, "billing.txt");
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_semantic_disabled_skips_embedder() {
        let mut mock = MockEmbedder::new();
        mock.expect_embed().times(0);
        let config = RetrieverConfig {
            semantic_enabled: false,
            ..RetrieverConfig::default()
        };
        let r = Retriever::new(config, Some(Arc::new(mock)));
        let result = r.retrieve("reset password", &embedded_corpus());
        assert_eq!(result.method, RetrievalMethod::Keyword);
    }

    #[test]
    fn test_empty_query_defaults() {
        let r = Retriever::new(
            RetrieverConfig::default(),
            Some(Arc::new(HashingEmbedder::default())),
        );
        let result = r.retrieve("  ", &embedded_corpus());
        assert_eq!(result, RetrievalResult::fallback());
    }

    #[test]
    fn test_empty_corpus_defaults() {
        let r = Retriever::new(RetrieverConfig::default(), None);
        let outcome = r.retrieve_detailed("password", &KnowledgeBase::default());
        assert_eq!(outcome.served_by, RetrievalMethod::Default);
        assert!(outcome.value.document.is_none());
        assert!(outcome.value.ranked.is_empty());
    }

    #[test]
    fn test_document_mirrors_first_ranked() {
        let r = Retriever::new(RetrieverConfig::default(), None);
        let result = r.retrieve("reset password refund", &corpus());
        assert_eq!(result.document.as_ref(), Some(&result.ranked[0].document));
        assert_eq!(result.score, result.ranked[0].score);
    }

    #[test]
    fn test_top_k_is_stable() {
        let doc = |id: &str| KnowledgeDocument::new(id, id, "");
        let ranked = top_k(
            vec![
                RankedDocument { document: doc("a"), score: 0.5 },
                RankedDocument { document: doc("b"), score: 0.9 },
                RankedDocument { document: doc("c"), score: 0.5 },
                RankedDocument { document: doc("d"), score: 0.1 },
            ],
            3,
        );
        let ids: Vec<_> = ranked.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
