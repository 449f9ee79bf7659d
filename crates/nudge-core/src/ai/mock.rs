//! Mock backend for testing
//!
//! Provides configurable mock responses for insight generation.
//! Useful for unit tests and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::GenerationRequest;
use super::AIBackend;

/// What the mock returns from `generate`
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Build plausible insights from the prompt's category breakdown
    Auto,
    /// Return this text verbatim
    Text(String),
    /// Fail with a model error carrying this message
    Fail(String),
}

/// Mock AI backend for testing
///
/// Clones share the call counter, so a clone handed to the pipeline can be
/// inspected from the test.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    response: MockResponse,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: MockResponse::Auto,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Mock that returns `text` for every request
    pub fn with_response(text: &str) -> Self {
        Self {
            response: MockResponse::Text(text.to_string()),
            ..Self::new()
        }
    }

    /// Mock whose every request fails
    pub fn failing(message: &str) -> Self {
        Self {
            response: MockResponse::Fail(message.to_string()),
            ..Self::new()
        }
    }

    /// Delay each response (for timeout and concurrency tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Pull "  Category: $amount" lines out of an insight prompt
fn categories_from_prompt(prompt: &str) -> Vec<(String, String)> {
    prompt
        .lines()
        .skip_while(|l| !l.starts_with("By category:"))
        .skip(1)
        .take_while(|l| l.starts_with("  "))
        .filter_map(|l| {
            let (name, amount) = l.trim().rsplit_once(": ")?;
            Some((name.to_string(), amount.to_string()))
        })
        .collect()
}

fn auto_response(prompt: &str) -> String {
    let categories = categories_from_prompt(prompt);
    let insights: Vec<serde_json::Value> = if categories.is_empty() {
        vec![serde_json::json!({
            "insight": "Spending looks steady",
            "tip": "Keep tracking your purchases"
        })]
    } else {
        categories
            .iter()
            .take(3)
            .map(|(name, amount)| {
                serde_json::json!({
                    "insight": format!("You spent {} on {}", amount, name),
                    "tip": format!("Review your {} purchases for savings", name),
                })
            })
            .collect()
    };

    format!(
        "```json\n{}\n```",
        serde_json::Value::Array(insights)
    )
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.response {
            MockResponse::Auto => Ok(auto_response(&request.prompt)),
            MockResponse::Text(text) => Ok(text.clone()),
            MockResponse::Fail(message) => Err(Error::Model(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn kind(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
