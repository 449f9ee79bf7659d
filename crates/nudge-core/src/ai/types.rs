//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// A text-generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Behavioral instructions (system prompt lines)
    pub system_instructions: Vec<String>,
    /// The user prompt
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(system_instructions: Vec<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instructions,
            prompt: prompt.into(),
        }
    }

    /// System instructions joined into a single system prompt
    pub fn system_prompt(&self) -> String {
        self.system_instructions.join("\n")
    }
}

/// Backend identity for logging and the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendInfo {
    /// Backend kind (ollama, openai_compatible, mock)
    pub kind: String,
    /// Model name
    pub model: String,
    /// Server URL
    pub host: String,
}
