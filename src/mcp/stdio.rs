//! Stdio transport binding
//!
//! Newline-delimited JSON-RPC over a byte stream: one request per line, at
//! most one response line per request. Requests are processed strictly
//! sequentially, so responses leave in arrival order even when an earlier
//! call is slower than the ones behind it. Killing the process simply drops
//! whatever call is in flight.

use crate::canvas::CanvasClient;
use crate::dispatch::DispatchContext;
use crate::error::Result;
use crate::mcp::protocol::{codes, McpRequest, McpResponse};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

/// MCP server bound to a line-delimited byte stream
pub struct StdioServer {
    registry: Arc<ToolRegistry>,
    canvas: Arc<CanvasClient>,
}

impl StdioServer {
    pub fn new(registry: Arc<ToolRegistry>, canvas: Arc<CanvasClient>) -> Self {
        Self { registry, canvas }
    }

    /// Serve stdin/stdout until EOF. Stdout carries nothing but protocol
    /// lines; all logging goes to stderr.
    pub async fn run(&self) -> Result<()> {
        self.run_on(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve an arbitrary reader/writer pair
    pub async fn run_on<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<McpRequest>(trimmed) {
                Ok(request) => {
                    let ctx = DispatchContext::new(self.registry.clone(), self.canvas.clone());
                    ctx.handle_request(request).await
                }
                Err(e) => Some(McpResponse::error(
                    None,
                    codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                )),
            };

            if let Some(response) = response {
                let payload = serde_json::to_string(&response)?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }
}
