//! Keyword overlap search.
//!
//! Score = |query words ∩ document words| / |query words|, over lowercase
//! content words (stop words dropped). Anything above zero is a candidate.

use std::collections::HashSet;

use crate::error::StrategyError;
use crate::knowledge::KnowledgeBase;
use crate::text::content_words;
use crate::types::{RankedDocument, Ranking};

use super::top_k;

fn word_set(text: &str) -> HashSet<String> {
    content_words(text).into_iter().collect()
}

/// Overlap score of one document against the query word set.
pub fn overlap_score(query_words: &HashSet<String>, document_text: &str) -> f64 {
    if query_words.is_empty() {
        return 0.0;
    }
    let doc_words = word_set(document_text);
    let shared = query_words.intersection(&doc_words).count();
    shared as f64 / query_words.len() as f64
}

pub(crate) fn search(
    query: &str,
    corpus: &KnowledgeBase,
    limit: usize,
) -> Result<Ranking, StrategyError> {
    if corpus.is_empty() {
        return Err(StrategyError::ResourceUnavailable {
            resource: "knowledge base",
        });
    }
    if query.is_empty() {
        return Err(StrategyError::EmptyInput);
    }
    let query_words = word_set(query);
    if query_words.is_empty() {
        return Err(StrategyError::NoMatch);
    }

    let candidates: Vec<RankedDocument> = corpus
        .documents()
        .iter()
        .filter_map(|doc| {
            let score = overlap_score(&query_words, &doc.searchable_text());
            (score > 0.0).then(|| RankedDocument {
                document: doc.clone(),
                score,
            })
        })
        .collect();

    Ranking::new(top_k(candidates, limit)).ok_or(StrategyError::NoMatch)
}
