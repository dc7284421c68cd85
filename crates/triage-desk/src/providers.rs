//! HTTP model provider clients.
//!
//! Both clients are blocking (`reqwest::blocking`): the engine calls them
//! synchronously from worker threads, never from async code.

use std::time::Duration;

use reqwest::blocking::Client;
use resolution::{Embedder, ProviderError, ZeroShotClassifier, ZeroShotLabel};
use serde::{Deserialize, Serialize};

fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))
}

fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_connect() {
        ProviderError::Unavailable(e.to_string())
    } else {
        ProviderError::Request(e.to_string())
    }
}

fn send_json<B: Serialize>(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    body: &B,
) -> Result<String, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }
    let response = request.send().map_err(request_error)?;
    let status = response.status();
    let text = response.text().map_err(request_error)?;
    if !status.is_success() {
        return Err(ProviderError::Request(format!("{status}: {text}")));
    }
    Ok(text)
}

// ── Zero-shot classification ──────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Pick the highest-scoring label from a `{"labels": [..], "scores": [..]}`
/// response body.
pub fn parse_zero_shot_response(body: &str) -> Result<ZeroShotLabel, ProviderError> {
    let parsed: ZeroShotResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    if parsed.labels.len() != parsed.scores.len() {
        return Err(ProviderError::InvalidResponse(format!(
            "{} labels but {} scores",
            parsed.labels.len(),
            parsed.scores.len()
        )));
    }
    parsed
        .labels
        .into_iter()
        .zip(parsed.scores)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, probability)| ZeroShotLabel { label, probability })
        .ok_or_else(|| ProviderError::InvalidResponse("no labels returned".to_string()))
}

/// Zero-shot classifier behind a Hugging Face style inference endpoint.
pub struct HttpZeroShotClassifier {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpZeroShotClassifier {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            api_key,
        })
    }
}

impl ZeroShotClassifier for HttpZeroShotClassifier {
    fn classify_text(&self, text: &str, labels: &[String]) -> Result<ZeroShotLabel, ProviderError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        };
        let response = send_json(&self.client, &self.url, self.api_key.as_deref(), &body)?;
        parse_zero_shot_response(&response)
    }
}

// ── Embeddings ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// First embedding from an OpenAI-style `{"data": [{"embedding": [..]}]}`
/// response body.
pub fn parse_embedding_response(body: &str) -> Result<Vec<f32>, ProviderError> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    let embedding = parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| ProviderError::InvalidResponse("no embedding returned".to_string()))?;
    if embedding.is_empty() {
        return Err(ProviderError::InvalidResponse("empty embedding".to_string()));
    }
    Ok(embedding)
}

/// Embedder behind an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let response = send_json(&self.client, &self.url, self.api_key.as_deref(), &body)?;
        parse_embedding_response(&response)
    }
}
