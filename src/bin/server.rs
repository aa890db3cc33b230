//! Canvas MCP HTTP server
//!
//! One-shot JSON-RPC over HTTP: each POST to /mcp carries one request behind
//! a bearer-token gate. Run with: canvas-mcp-server --port 8080

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_mcp::auth::AccessGate;
use canvas_mcp::canvas::CanvasClient;
use canvas_mcp::config::Config;
use canvas_mcp::error::{CanvasMcpError, Result};
use canvas_mcp::http::{self, AppState};
use canvas_mcp::tools::catalog::build_registry;

#[derive(Parser, Debug)]
#[command(name = "canvas-mcp-server")]
#[command(about = "Canvas MCP server over one-shot HTTP")]
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

    /// Bearer token clients must present on /mcp
    #[arg(long, env = "MCP_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// TCP port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,
}

/// Assemble and validate the runtime configuration. The HTTP binding fails
/// closed: without a Canvas key and an auth token there is no server.
fn build_config(args: Args) -> Result<Config> {
    let canvas_api_key = args
        .canvas_api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| CanvasMcpError::Config("CANVAS_API_KEY is required".to_string()))?;

    let auth_token = args
        .auth_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CanvasMcpError::Config(
                "MCP_AUTH_TOKEN is required; refusing to serve /mcp unauthenticated".to_string(),
            )
        })?;

    let config = Config {
        canvas_api_key,
        canvas_base_url: args.canvas_base_url,
        debug: args.debug,
        gradescope_email: args.gradescope_email,
        gradescope_password: args.gradescope_password,
        auth_token: Some(auth_token),
        port: args.port,
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging goes to stderr; RUST_LOG overrides the flag-driven default.
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

    let config = build_config(args)?;

    let registry = Arc::new(build_registry()?);
    let canvas = Arc::new(CanvasClient::new(&config));
    let gate = AccessGate::new(config.auth_token.as_deref());

    tracing::info!(
        tools = registry.len(),
        base_url = %config.api_base(),
        port = config.port,
        "starting Canvas MCP HTTP server"
    );

    http::serve(AppState::new(registry, canvas, gate), config.port).await
}
