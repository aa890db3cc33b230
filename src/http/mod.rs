//! One-shot HTTP transport binding
//!
//! Each `POST /mcp` carries exactly one JSON-RPC request and receives exactly
//! one response body; nothing survives the exchange. `/health` and `/` are
//! public; everything under `/mcp` sits behind the bearer-token gate, which
//! runs before the body is even parsed.

use crate::auth::{AccessGate, AuthError};
use crate::canvas::CanvasClient;
use crate::dispatch::DispatchContext;
use crate::error::Result;
use crate::mcp::protocol::{codes, InitializeResult, McpRequest, McpResponse};
use crate::tools::ToolRegistry;
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared read-only state behind every route
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ToolRegistry>,
    canvas: Arc<CanvasClient>,
    gate: AccessGate,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>, canvas: Arc<CanvasClient>, gate: AccessGate) -> Self {
        Self {
            registry,
            canvas,
            gate,
        }
    }

    fn dispatch_context(&self) -> DispatchContext {
        DispatchContext::new(self.registry.clone(), self.canvas.clone())
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .route("/mcp", post(mcp_post).get(mcp_get).delete(mcp_delete))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

/// Health check endpoint; outside the gate
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "canvas-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Server and catalog metadata; outside the gate
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<&str> = state
        .registry
        .list()
        .iter()
        .map(|t| t.name.as_str())
        .collect();

    Json(json!({
        "name": "canvas-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Model Context Protocol server for Canvas LMS integration",
        "endpoints": {
            "health": "/health",
            "mcp": "/mcp (POST with JSON-RPC)",
        },
        "tools": tools,
    }))
}

/// The MCP endpoint proper: gate, parse, dispatch, one response body
async fn mcp_post(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if let Err(denied) = state.gate.authenticate(&headers) {
        return auth_rejection(denied);
    }

    let request: McpRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "unreadable /mcp request body");
            return framing_error(e.to_string());
        }
    };

    match state.dispatch_context().handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        // Notification: nothing to send back in a one-shot exchange
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Capability discovery for clients probing the endpoint with GET
async fn mcp_get(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(denied) = state.gate.authenticate(&headers) {
        return auth_rejection(denied);
    }
    let envelope = McpResponse::success(None, json!(InitializeResult::default()));
    (StatusCode::OK, Json(envelope)).into_response()
}

/// Session teardown is a no-op; there are no sessions to tear down
async fn mcp_delete(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(denied) = state.gate.authenticate(&headers) {
        return auth_rejection(denied);
    }
    let envelope = McpResponse::success(None, json!({}));
    (StatusCode::OK, Json(envelope)).into_response()
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "Use POST /mcp for JSON-RPC requests or GET /health for status",
        })),
    )
}

/// Malformed request body: protocol-level error envelope on a 500
fn framing_error(message: String) -> Response {
    let body = McpResponse::error(None, codes::INTERNAL_ERROR, message);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Map a gate refusal to its HTTP shape. The body never echoes whatever
/// credential the client presented.
fn auth_rejection(denied: AuthError) -> Response {
    match denied {
        AuthError::Misconfigured => {
            error!("refusing request: access token not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Server misconfigured",
                    "message": denied.to_string(),
                })),
            )
                .into_response()
        }
        AuthError::MissingCredential | AuthError::InvalidCredential => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Unauthorized",
                "message": denied.to_string(),
            })),
        )
            .into_response(),
    }
}
