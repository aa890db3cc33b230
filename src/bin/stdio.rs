//! Canvas MCP stdio server
//!
//! Newline-delimited JSON-RPC over stdin/stdout, for MCP clients that spawn
//! the server as a child process. Stdout carries only protocol lines; all
//! logging goes to stderr.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_mcp::canvas::CanvasClient;
use canvas_mcp::config::Config;
use canvas_mcp::error::Result;
use canvas_mcp::mcp::StdioServer;
use canvas_mcp::tools::catalog::build_registry;

#[derive(Parser, Debug)]
#[command(name = "canvas-mcp-stdio")]
#[command(about = "Canvas MCP server over stdio")]
struct Args {
    /// Canvas API access token
    #[arg(long, env = "CANVAS_API_KEY", hide_env_values = true)]
    canvas_api_key: Option<String>,

    /// Canvas instance base URL
    #[arg(
        long,
        env = "CANVAS_BASE_URL",
        default_value = "https://canvas.instructure.com"
    )]
    canvas_base_url: String,

    /// Default to debug-level logging (RUST_LOG still takes precedence)
    #[arg(long, env = "DEBUG")]
    debug: bool,

    /// Gradescope account email (reserved for the Gradescope integration)
    #[arg(long, env = "GRADESCOPE_EMAIL")]
    gradescope_email: Option<String>,

    /// Gradescope account password (reserved for the Gradescope integration)
    #[arg(long, env = "GRADESCOPE_PASSWORD", hide_env_values = true)]
    gradescope_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    // Unlike the HTTP binary, start without a key so clients can still list
    // tools; every call then surfaces Canvas's 401 as a tool failure.
    if args.canvas_api_key.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("CANVAS_API_KEY is not set; tool calls will fail against Canvas");
    }

    let config = Config {
        canvas_api_key: args.canvas_api_key.unwrap_or_default(),
        canvas_base_url: args.canvas_base_url,
        debug: args.debug,
        gradescope_email: args.gradescope_email,
        gradescope_password: args.gradescope_password,
        ..Default::default()
    };
    config.validate()?;

    let registry = Arc::new(build_registry()?);
    let canvas = Arc::new(CanvasClient::new(&config));

    tracing::info!(tools = registry.len(), "starting Canvas MCP stdio server");
    StdioServer::new(registry, canvas).run().await
}
