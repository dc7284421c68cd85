//! Desk configuration: TOML file, then `TRIAGE_*` environment overrides,
//! then command-line flags (applied by `main`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use resolution::EngineConfig;
use serde::{Deserialize, Serialize};

/// Model provider endpoints. Every endpoint is optional; a missing one
/// means that capability is absent and the engine falls back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Hugging Face style zero-shot classification endpoint
    pub zero_shot_url: Option<String>,
    /// OpenAI-compatible base URL; `/embeddings` is appended
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub api_key: Option<String>,
    /// Use the built-in hashing embedder when no embedding URL is set
    pub local_embeddings: bool,
    /// HTTP request timeout for provider calls
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            zero_shot_url: None,
            embedding_url: None,
            embedding_model: "text-embedding-3-small".to_string(),
            api_key: None,
            local_embeddings: true,
            request_timeout_secs: 30,
        }
    }
}

/// Top-level desk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Directory of `*.txt` knowledge articles
    pub kb_dir: PathBuf,
    /// JSON corpus; takes precedence over `kb_dir` when set
    pub kb_json: Option<PathBuf>,
    /// Append every decision to this JSONL file
    pub decision_log: Option<PathBuf>,
    /// Tickets resolved at once by `batch`
    pub max_in_flight: usize,
    pub providers: ProviderSettings,
    pub engine: EngineConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            kb_dir: PathBuf::from("knowledge_base"),
            kb_json: None,
            decision_log: None,
            max_in_flight: 8,
            providers: ProviderSettings::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Load from an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DeskConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `TRIAGE_*` overrides. `lookup` returns the variable's value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TRIAGE_KB_DIR") {
            self.kb_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("TRIAGE_LOG_PATH") {
            self.decision_log = Some(PathBuf::from(path));
        }
        if let Some(v) = parsed(&lookup, "TRIAGE_CONFIDENCE_THRESHOLD")? {
            self.engine.classifier.confidence_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "TRIAGE_RELEVANCE_THRESHOLD")? {
            self.engine.retriever.relevance_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "TRIAGE_TOP_K")? {
            self.engine.retriever.top_k = v;
        }
        if let Some(v) = parsed(&lookup, "TRIAGE_MODEL_TIMEOUT_MS")? {
            self.engine.classifier.model_timeout_ms = Some(v);
            self.engine.retriever.embed_timeout_ms = Some(v);
        }
        if let Some(url) = lookup("TRIAGE_ZERO_SHOT_URL") {
            self.providers.zero_shot_url = Some(url);
        }
        if let Some(url) = lookup("TRIAGE_EMBEDDING_URL") {
            self.providers.embedding_url = Some(url);
        }
        if let Some(model) = lookup("TRIAGE_EMBEDDING_MODEL") {
            self.providers.embedding_model = model;
        }
        if let Some(key) = lookup("TRIAGE_API_KEY") {
            self.providers.api_key = Some(key);
        }
        Ok(())
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'"))
        })
        .transpose()
}
