//! Pluggable AI backend abstraction
//!
//! This module provides a backend-agnostic interface for insight generation.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let request = GenerationRequest::new(system_instructions(), prompt);
//!     let text = client.generate(&request).await?;
//!     let insights = parse_insights(&text)?;
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MockResponse};
pub use ollama::{OllamaBackend, DEFAULT_OLLAMA_MODEL};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_OPENAI_MODEL};
pub use parsing::parse_insights;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send a request to the model and return its raw text reply
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Backend kind (for logging and the health endpoint)
    fn kind(&self) -> &'static str;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Backend identity snapshot
    fn info(&self) -> BackendInfo {
        BackendInfo {
            kind: self.kind().to_string(),
            model: self.model().to_string(),
            host: self.host().to_string(),
        }
    }
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (OpenAI, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
        Self::from_backend_name(&backend)
    }

    fn from_backend_name(backend: &str) -> Option<Self> {
        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "none" | "off" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create an OpenAI-compatible backend directly
    pub fn openai_compatible(host: &str, model: &str, api_key: Option<&str>) -> Self {
        let backend = match api_key {
            Some(key) => OpenAICompatibleBackend::with_api_key(host, model, key),
            None => OpenAICompatibleBackend::new(host, model),
        };
        AIClient::OpenAICompatible(backend)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate(request).await,
            AIClient::OpenAICompatible(b) => b.generate(request).await,
            AIClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AIClient::Ollama(b) => b.kind(),
            AIClient::OpenAICompatible(b) => b.kind(),
            AIClient::Mock(b) => b.kind(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}
