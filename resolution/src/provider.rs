//! Model provider capabilities.
//!
//! The engine depends on two optional capabilities: zero-shot text
//! classification and text embedding. Either may be absent (`None`), in
//! which case the strategies that need it report themselves unavailable
//! and the fallback chain moves on.
//!
//! Implementations must be safe to call from many threads at once;
//! inference is read-only.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, StrategyError};
use crate::text::content_words;

/// Best label returned by a zero-shot classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotLabel {
    pub label: String,
    pub probability: f64,
}

/// Zero-shot classification against a caller-supplied label set.
#[cfg_attr(test, mockall::automock)]
pub trait ZeroShotClassifier: Send + Sync {
    fn classify_text(&self, text: &str, labels: &[String]) -> Result<ZeroShotLabel, ProviderError>;
}

/// Text embedding.
#[cfg_attr(test, mockall::automock)]
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// The model capabilities loaded at startup. Read-only afterwards.
#[derive(Clone, Default)]
pub struct ModelCapabilities {
    pub zero_shot: Option<Arc<dyn ZeroShotClassifier>>,
    pub embedder: Option<Arc<dyn Embedder>>,
}

impl ModelCapabilities {
    /// No models at all: keyword strategies and defaults only.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_zero_shot(mut self, classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        self.zero_shot = Some(classifier);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }
}

impl std::fmt::Debug for ModelCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCapabilities")
            .field("zero_shot", &self.zero_shot.is_some())
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

/// Run a provider call, optionally bounded by a deadline.
///
/// With a deadline the call runs on a helper thread. If it does not finish
/// in time the caller stops waiting and gets [`StrategyError::Timeout`].
/// The helper thread is not cancelled: it runs until the provider call
/// returns and its late result is dropped. Providers must bound their own
/// calls (an HTTP client timeout no longer than the deadline) or hung calls
/// pile up threads.
pub(crate) fn call_with_deadline<T, F>(
    deadline: Option<Duration>,
    call: F,
) -> Result<T, StrategyError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
{
    let Some(deadline) = deadline else {
        return call().map_err(StrategyError::from);
    };

    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("model-call".to_string())
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|e| StrategyError::Fault(format!("failed to spawn model call: {e}")))?;

    match rx.recv_timeout(deadline) {
        Ok(result) => result.map_err(StrategyError::from),
        Err(RecvTimeoutError::Timeout) => Err(StrategyError::Timeout {
            millis: deadline.as_millis() as u64,
        }),
        Err(RecvTimeoutError::Disconnected) => {
            Err(StrategyError::Fault("model call panicked".to_string()))
        }
    }
}

/// Deterministic local embedder: feature-hashed bag of content words.
///
/// No model download and no network, so semantic retrieval works offline.
/// Quality is close to keyword overlap; good enough as a stand-in and for
/// tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in content_words(text) {
            let hash = fnv1a(word.as_bytes());
            let slot = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
