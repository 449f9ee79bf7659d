//! Nudge Web Server
//!
//! Axum-based REST API for the Nudge spending-insights service.
//!
//! Security features:
//! - Restrictive CORS policy (explicit origin list)
//! - Input validation on transaction creation
//! - Security headers (CSP, nosniff, frame denial)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use nudge_core::ai::AIBackend;
use nudge_core::db::Database;
use nudge_core::insights::InsightEngine;

mod handlers;

/// Environment variable holding allowed CORS origins (comma-separated)
pub const ALLOWED_ORIGINS_ENV: &str = "NUDGE_ALLOWED_ORIGINS";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Self {
        Self {
            allowed_origins: std::env::var(ALLOWED_ORIGINS_ENV)
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        }
    }
}

/// Parse a comma-separated list of origins
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Insight pipeline (owns the process-wide result cache)
    pub engine: InsightEngine,
}

/// Create the application router
pub fn create_router(
    db: Database,
    engine: InsightEngine,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        engine,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/:id", get(handlers::get_transaction))
        .route("/insights", get(handlers::get_insights));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    // Security headers
    // CSP: restrict everything to same-origin, allow inline styles for the dashboard
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let engine = InsightEngine::from_env()?;
    check_ai_connection(&engine).await;

    if !config.allowed_origins.is_empty() {
        info!(origins = ?config.allowed_origins, "CORS origins allowed");
    }

    let app = create_router(db, engine, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(engine: &InsightEngine) {
    match engine.ai() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "AI backend connected: {} {} (model: {})",
                    client.kind(),
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "AI backend configured but not responding: {} (insights will use the fallback until it recovers)",
                    client.host()
                );
            }
        }
        None => {
            info!("AI backend not configured (set AI_BACKEND and OLLAMA_HOST or OPENAI_COMPATIBLE_HOST to enable)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
