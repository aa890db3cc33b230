//! Error types for the Canvas MCP server

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, CanvasMcpError>;

/// Main error type for the Canvas MCP server
#[derive(Error, Debug)]
pub enum CanvasMcpError {
    #[error("Invalid arguments for '{tool}': {issues}")]
    Validation { tool: String, issues: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("Invalid input schema for tool '{tool}': {reason}")]
    InvalidSchema { tool: String, reason: String },

    #[error("Canvas API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanvasMcpError {
    /// Get error code for the MCP protocol
    pub fn code(&self) -> i64 {
        match self {
            CanvasMcpError::Validation { .. } => -32602,
            CanvasMcpError::UnknownTool(_) => -32601,
            CanvasMcpError::Serialization(_) => -32700,
            _ => -32603,
        }
    }
}
