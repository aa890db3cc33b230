//! Tool-call dispatch shared by both transport bindings
//!
//! A `DispatchContext` is built fresh for every inbound request (two `Arc`
//! clones), so no request can see another's state. Tool-level failures are
//! normalized into `ToolOutcome::Failure` and travel as `isError` results;
//! only malformed envelopes produce JSON-RPC errors.

use crate::canvas::CanvasClient;
use crate::mcp::protocol::{
    codes, methods, InitializeResult, McpRequest, McpResponse, ToolCallResult,
};
use crate::tools::{ToolCall, ToolOutcome, ToolRegistry};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-request dispatch facade over the shared registry and Canvas client
pub struct DispatchContext {
    registry: Arc<ToolRegistry>,
    canvas: Arc<CanvasClient>,
}

impl DispatchContext {
    pub fn new(registry: Arc<ToolRegistry>, canvas: Arc<CanvasClient>) -> Self {
        Self { registry, canvas }
    }

    /// Route one JSON-RPC request. `None` means the request was a
    /// notification and nothing is sent back.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification acknowledged");
            return None;
        }

        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                McpResponse::success(request.id, json!(InitializeResult::default()))
            }
            methods::LIST_TOOLS => {
                McpResponse::success(request.id, json!({"tools": self.registry.list()}))
            }
            methods::CALL_TOOL => match serde_json::from_value::<ToolCall>(request.params) {
                Ok(call) => {
                    let result = match self.dispatch(call).await {
                        ToolOutcome::Success(payload) => ToolCallResult::json(&payload),
                        ToolOutcome::Failure(message) => ToolCallResult::error(message),
                    };
                    McpResponse::success(request.id, json!(result))
                }
                Err(e) => McpResponse::error(
                    request.id,
                    codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ),
            },
            _ => McpResponse::error(
                request.id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    /// Look up, validate, invoke, normalize. Never a protocol error and
    /// never a panic; every failure path ends in `ToolOutcome::Failure`.
    pub async fn dispatch(&self, call: ToolCall) -> ToolOutcome {
        let handler = match self.registry.lookup(&call.name) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(tool = %call.name, "tool lookup failed");
                return ToolOutcome::Failure(err.to_string());
            }
        };

        if let Err(err) = self.registry.validate(&call.name, &call.arguments) {
            warn!(tool = %call.name, error = %err, "argument validation failed");
            return ToolOutcome::Failure(err.to_string());
        }

        debug!(tool = %call.name, "dispatching tool call");
        match handler(self.canvas.clone(), call.arguments).await {
            Ok(payload) => ToolOutcome::Success(payload),
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool invocation failed");
                ToolOutcome::Failure(err.to_string())
            }
        }
    }
}
