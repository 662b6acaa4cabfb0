
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::AdvisorError;
use crate::config::{Config, Credentials};
use crate::embeddings::Embedder;
use crate::llm::ChatModel;

/// Client for an OpenAI-compatible API serving both embeddings and chat completions
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    embedding_model: String,
    batch_size: usize,
    temperature: f32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let base_url = config
            .provider
            .base_url()
            .context("Failed to parse provider base URL from config")?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: credentials.api_key().to_string(),
            embedding_model: config.models.embedding_model.clone(),
            batch_size: config.provider.embedding_batch_size.max(1) as usize,
            temperature: config.models.temperature,
            agent: build_agent(Duration::from_secs(config.provider.request_timeout_seconds)),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    /// List the models visible to the configured API key
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("models");
        debug!("Fetching available models from {}", url);

        let mut response = self
            .agent
            .get(url.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .call()
            .context("Failed to reach model provider")?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read models response")?;
        ensure_success(status.as_u16(), &body)?;

        let models: ModelsResponse =
            serde_json::from_str(&body).context("Failed to parse models response")?;
        Ok(models.data)
    }

    /// Verify the provider is reachable and the embedding model is listed
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        let models = self.list_models().context("Model listing failed")?;
        if !models.iter().any(|m| m.id == self.embedding_model) {
            anyhow::bail!(
                "Embedding model '{}' is not available from {}",
                self.embedding_model,
                self.base_url
            );
        }
        info!("Health check passed for {}", self.base_url);
        Ok(())
    }

    /// Embed texts in batches of the configured size, preserving input order
    #[inline]
    pub fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let batch_vectors = self
                .embed_single_batch(batch)
                .with_context(|| format!("Failed to embed batch of {} texts", batch.len()))?;
            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let response: EmbeddingsResponse = self.post_json("embeddings", &request)?;

        if response.data.len() != texts.len() {
            anyhow::bail!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.data.len()
            );
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// Run a single-message chat completion and return the assistant text
    #[inline]
    pub fn chat_completion(&self, model: &str, prompt: &str) -> Result<String> {
        debug!("Requesting completion from {} ({} chars)", model, prompt.len());

        let request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };
        let response: ChatResponse = self.post_json("chat/completions", &request)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Completion response contained no message content")
    }

    fn post_json<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let url = self.endpoint(path);
        let request_json = serde_json::to_string(body).context("Failed to serialize request")?;

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&request_json)
            .with_context(|| format!("Failed to call {}", url))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read response from {}", url))?;
        ensure_success(status.as_u16(), &text)?;

        serde_json::from_str(&text).with_context(|| format!("Failed to parse response from {}", url))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

fn ensure_success(status: u16, body: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    anyhow::bail!("Provider returned HTTP {}: {}", status, message)
}

impl Embedder for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        self.embed_texts(texts)
            .map_err(|e| AdvisorError::Embedding(format!("{e:#}")))
    }
}

impl ChatModel for OpenAiClient {
    fn complete(&self, model: &str, prompt: &str) -> crate::Result<String> {
        self.chat_completion(model, prompt)
            .map_err(|e| AdvisorError::Llm(format!("{e:#}")))
    }
}
