//! Knowledge base loading.
//!
//! The corpus is loaded once at startup and shared read-only (behind an
//! `Arc`) by every request. Reloading means restarting the process.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::KnowledgeError;
use crate::provider::Embedder;
use crate::types::KnowledgeDocument;

/// The loaded document collection, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeBase {
    /// Build from documents already in memory. Ids must be unique.
    pub fn from_documents(documents: Vec<KnowledgeDocument>) -> Result<Self, KnowledgeError> {
        let mut seen = HashSet::new();
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(KnowledgeError::DuplicateId(doc.id.clone()));
            }
        }
        Ok(Self { documents })
    }

    /// Load every `*.txt` file in `dir`, sorted by file name.
    ///
    /// The file name is the document id; the title is the stem with `_`
    /// and `-` turned into spaces. A missing directory gives an empty
    /// corpus, which makes retrieval always fall back to its default.
    pub fn load_dir(dir: &Path) -> Result<Self, KnowledgeError> {
        if !dir.exists() {
            warn!(path = %dir.display(), "Knowledge base directory not found, starting empty");
            return Ok(Self::default());
        }

        let io_err = |source| KnowledgeError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let body = fs::read_to_string(&path).map_err(|source| KnowledgeError::Io {
                path: path.clone(),
                source,
            })?;
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
                .unwrap_or_default();
            documents.push(KnowledgeDocument::new(id, title, body.trim()));
        }

        info!(path = %dir.display(), documents = documents.len(), "Loaded knowledge base");
        Self::from_documents(documents)
    }

    /// Load a JSON array of documents (embeddings optional).
    pub fn load_json(path: &Path) -> Result<Self, KnowledgeError> {
        let content = fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let documents: Vec<KnowledgeDocument> =
            serde_json::from_str(&content).map_err(|source| KnowledgeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), documents = documents.len(), "Loaded knowledge base");
        Self::from_documents(documents)
    }

    /// Compute embeddings for documents that have none.
    ///
    /// Called once at startup, before the corpus is shared. A failed
    /// embedding leaves that document without one; semantic search then
    /// skips it. Returns how many documents were embedded.
    pub fn embed_missing(&mut self, embedder: &dyn Embedder) -> usize {
        let mut embedded = 0;
        for doc in self
            .documents
            .iter_mut()
            .filter(|d| d.precomputed_embedding.is_none())
        {
            match embedder.embed(&doc.searchable_text()) {
                Ok(vector) => {
                    doc.precomputed_embedding = Some(vector);
                    embedded += 1;
                }
                Err(e) => {
                    warn!(doc = %doc.id, error = %e, "Failed to embed knowledge document");
                }
            }
        }
        embedded
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether any document carries an embedding.
    pub fn has_embeddings(&self) -> bool {
        self.documents
            .iter()
            .any(|d| d.precomputed_embedding.is_some())
    }
}
