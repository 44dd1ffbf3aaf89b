//! Model endpoint client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ModelConfig;

/// Which generation pass produced output we could not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Steps,
    Questions,
}

impl OutputKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::Steps => "steps",
            OutputKind::Questions => "questions",
        }
    }
}

/// Generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The endpoint was unreachable, answered with a non-success status, or
    /// sent a body without a `response` field.
    #[error("generation failed: {0}")]
    Transport(String),

    /// The call succeeded but nothing in the text matched the expected format.
    #[error("could not understand model output for {}", .0.label())]
    Unparseable(OutputKind),
}

/// Something that turns a prompt into raw model text.
pub trait ModelClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-style `/api/generate` endpoint.
///
/// Requests are non-streaming and have no timeout: a call blocks until the
/// model answers or the transport gives up.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| GenerateError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

impl ModelClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.url();
        debug!(url = %url, model = %self.model, prompt_len = prompt.len(), "model_request");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .map_err(|e| {
                warn!(url = %url, error = %e, "model_request_failed");
                GenerateError::Transport(format!("request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "model_request_rejected");
            return Err(GenerateError::Transport(format!("HTTP {} from {}", status, url)));
        }

        let body: GenerateResponse = response.json().map_err(|e| {
            warn!(url = %url, error = %e, "model_response_invalid");
            GenerateError::Transport(format!("invalid response body: {}", e))
        })?;

        debug!(response_len = body.response.len(), "model_response");
        Ok(body.response)
    }
}
