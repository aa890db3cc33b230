//! Canvas MCP - Model Context Protocol server for Canvas LMS
//!
//! Exposes a fixed catalog of read-only Canvas tools (courses, assignments,
//! grades, modules, and so on) to LLM tool-callers over JSON-RPC 2.0, on two
//! transports: newline-delimited stdio and a stateless one-shot HTTP binding.

pub mod auth;
pub mod canvas;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod mcp;
pub mod tools;

pub use canvas::CanvasClient;
pub use config::Config;
pub use dispatch::DispatchContext;
pub use error::{CanvasMcpError, Result};
pub use tools::{ToolCall, ToolOutcome, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
