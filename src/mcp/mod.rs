//! MCP (Model Context Protocol) plumbing
//!
//! JSON-RPC 2.0 wire types plus the stdio transport binding. The HTTP
//! binding lives in `crate::http` and shares the same protocol types.

pub mod protocol;
pub mod stdio;

pub use protocol::{
    codes, methods, InitializeResult, McpError, McpRequest, McpResponse, ToolCallResult,
    ToolContent, PROTOCOL_VERSION,
};
pub use stdio::StdioServer;
