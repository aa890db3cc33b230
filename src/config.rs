//! Runtime configuration for the Canvas MCP server
//!
//! Values come from CLI flags or environment variables (the binaries wire
//! them up with clap). Secrets are held in memory as plain strings but are
//! redacted from `Debug` output so they cannot leak through logging.

use crate::error::{CanvasMcpError, Result};
use std::fmt;

/// Server configuration shared by both transport binaries
#[derive(Clone)]
pub struct Config {
    /// Canvas API bearer token used for every upstream request
    pub canvas_api_key: String,
    /// Base URL of the Canvas instance, e.g. `https://school.instructure.com`
    pub canvas_base_url: String,
    /// Enable debug-level logging by default
    pub debug: bool,
    /// Optional Gradescope account email (reserved; drives no tools)
    pub gradescope_email: Option<String>,
    /// Optional Gradescope account password (reserved; drives no tools)
    pub gradescope_password: Option<String>,
    /// Bearer token clients must present on the HTTP `/mcp` endpoint
    pub auth_token: Option<String>,
    /// TCP port for the HTTP binding
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_api_key: String::new(),
            canvas_base_url: "https://canvas.instructure.com".to_string(),
            debug: false,
            gradescope_email: None,
            gradescope_password: None,
            auth_token: None,
            port: 8080,
        }
    }
}

impl Config {
    /// Base URL with any trailing slash trimmed, ready for path joining
    pub fn api_base(&self) -> &str {
        self.canvas_base_url.trim_end_matches('/')
    }

    /// Check cross-field constraints. Startup-time only; the binaries treat
    /// a failure here as fatal.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_base_url.trim().is_empty() {
            return Err(CanvasMcpError::Config(
                "CANVAS_BASE_URL must not be empty".to_string(),
            ));
        }

        match (&self.gradescope_email, &self.gradescope_password) {
            (Some(_), None) | (None, Some(_)) => Err(CanvasMcpError::Config(
                "GRADESCOPE_EMAIL and GRADESCOPE_PASSWORD must be set together".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("canvas_api_key", &redact(&self.canvas_api_key))
            .field("canvas_base_url", &self.canvas_base_url)
            .field("debug", &self.debug)
            .field("gradescope_email", &self.gradescope_email)
            .field(
                "gradescope_password",
                &self.gradescope_password.as_deref().map(redact),
            )
            .field("auth_token", &self.auth_token.as_deref().map(redact))
            .field("port", &self.port)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
