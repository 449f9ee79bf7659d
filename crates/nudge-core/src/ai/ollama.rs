//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. System instructions
//! are sent through Ollama's `system` field.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::GenerationRequest;
use super::AIBackend;

/// Default model when `OLLAMA_MODEL` is unset
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OLLAMA_HOST`
    /// Optional: `OLLAMA_MODEL` (default: llama3.2)
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let system = request.system_prompt();
        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            system: if system.is_empty() { None } else { Some(system) },
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!("Ollama API error {}: {}", status, text)));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("Malformed Ollama response: {}", e)))?;
        debug!("Ollama insights response: {}", ollama_response.response);

        Ok(ollama_response.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn kind(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
