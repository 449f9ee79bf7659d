//! Test utilities for nudge-core
//!
//! This module provides testing infrastructure including a mock Ollama server
//! that can be used for development and integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::models::Transaction;

/// How the mock server answers `/api/generate`
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Fenced JSON insights built from the prompt's category lines
    Insights,
    /// This text, verbatim, as the model response
    Text(String),
    /// An HTTP 500 from the API
    ServerError,
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    generate_calls: Arc<AtomicUsize>,
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    generate_calls: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockReply::Insights).await
    }

    /// Start a mock server with a fixed reply mode
    pub async fn start_with(reply: MockReply) -> Self {
        let generate_calls = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            reply,
            generate_calls: generate_calls.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            generate_calls,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `/api/generate` requests served
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<MockState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    state.generate_calls.fetch_add(1, Ordering::SeqCst);

    let response = match &state.reply {
        MockReply::Insights => insights_from_prompt(&request.prompt),
        MockReply::Text(text) => text.clone(),
        MockReply::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
        }
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
    .into_response()
}

/// Turn the "By category:" lines of an insights prompt into a fenced reply
fn insights_from_prompt(prompt: &str) -> String {
    let insights: Vec<serde_json::Value> = prompt
        .lines()
        .skip_while(|l| !l.starts_with("By category:"))
        .skip(1)
        .take_while(|l| l.starts_with("  "))
        .filter_map(|l| l.trim().rsplit_once(": "))
        .map(|(category, amount)| {
            serde_json::json!({
                "insight": format!("{} accounts for {}", category, amount),
                "tip": format!("Set a monthly cap for {}", category),
            })
        })
        .collect();

    format!(
        "Here are your insights:\n```json\n{}\n```",
        serde_json::Value::Array(insights)
    )
}

/// Build a transaction for tests
pub fn transaction(id: &str, amount: f64, category: &str, timestamp: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount,
        category: category.to_string(),
        timestamp: timestamp.to_string(),
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_from_prompt() {
        let prompt = "Total spent this week: $30.00\nBy category:\n  Food: $20.00\n  Fun: $10.00\n\n\nProvide";
        let reply = insights_from_prompt(prompt);
        let insights = crate::ai::parse_insights(&reply).unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].insight, "Food accounts for $20.00");
    }

    #[tokio::test]
    async fn test_mock_server_health() {
        let server = MockOllamaServer::start().await;
        let resp = reqwest::get(format!("{}/api/tags", server.url()))
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(server.generate_calls(), 0);
    }
}
