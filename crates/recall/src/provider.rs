//! Embedding provider implementations.
//!
//! Three providers sit behind the core [`EmbeddingProvider`] trait:
//! - **[`DisabledProvider`]** — errors on use; the default when
//!   embeddings are not configured.
//! - **[`OpenAIProvider`]** — calls the OpenAI embeddings API with
//!   retry and backoff.
//! - **[`TimeoutProvider`]** — decorator that bounds any provider with
//!   a deadline; an elapsed timeout degrades to "embedding absent"
//!   rather than hanging retrieval.
//!
//! # Retry Strategy
//!
//! The OpenAI provider uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::warn;

use recall_core::embedding::EmbeddingProvider;

use crate::config::EmbeddingConfig;

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    fn dimension(&self) -> usize {
        0
    }

    async fn embed(&self, _text: &str) -> Result<Option<Vec<f32>>> {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.")
    }
}

/// Embedding provider using the OpenAI API.
///
/// Calls `POST /v1/embeddings` with the configured model. Requires the
/// `OPENAI_API_KEY` environment variable.
pub struct OpenAIProvider {
    model: String,
    dims: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Fails when `model` or `dims` is missing from config, or when
    /// `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for OpenAI provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for OpenAI provider"))?;

        if std::env::var("OPENAI_API_KEY").is_err() {
            bail!("OPENAI_API_KEY environment variable not set");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            dims,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn call_api(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post("https://api.openai.com/v1/embeddings")
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_openai_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Embedding failed after retries")))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        // Blank input never reaches the API; absent is the contract,
        // not a zero vector.
        if text.trim().is_empty() {
            return Ok(None);
        }

        let vec = self.call_api(text).await?;
        if vec.len() != self.dims {
            warn!(
                got = vec.len(),
                expected = self.dims,
                model = %self.model,
                "embedding response has unexpected dimension"
            );
        }
        Ok(Some(vec))
    }
}

/// Parse the OpenAI embeddings API response JSON for a single input.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing data array"))?;

    let embedding = data
        .first()
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing embedding"))?;

    Ok(embedding
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}

/// Decorator bounding another provider's `embed` with a deadline.
///
/// The embedding call is the only unbounded-latency step in retrieval;
/// when the deadline elapses the call degrades to `Ok(None)` so the
/// caller observes "embedding absent" instead of a hang.
pub struct TimeoutProvider {
    inner: Arc<dyn EmbeddingProvider>,
    deadline: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl EmbeddingProvider for TimeoutProvider {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        match tokio::time::timeout(self.deadline, self.inner.embed(text)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    deadline_secs = self.deadline.as_secs(),
                    model = self.inner.model_name(),
                    "embedding call exceeded deadline, treating as absent"
                );
                Ok(None)
            }
        }
    }
}

/// Create the configured [`EmbeddingProvider`], wrapped with the
/// configured deadline.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let inner: Arc<dyn EmbeddingProvider> = match config.provider.as_str() {
        "disabled" => Arc::new(DisabledProvider),
        "openai" => Arc::new(OpenAIProvider::new(config)?),
        other => bail!("Unknown embedding provider: {}", other),
    };

    Ok(Arc::new(TimeoutProvider::new(
        inner,
        Duration::from_secs(config.timeout_secs),
    )))
}
