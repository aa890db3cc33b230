//! Bearer-token gate for the HTTP binding
//!
//! The stdio binding trusts its parent process and never goes through the
//! gate; every `/mcp` request over HTTP does, before any body parsing or
//! tool dispatch happens.

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Why a request was refused at the gate
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No token configured on the server side. Fail closed.
    #[error("server access token is not configured")]
    Misconfigured,
    /// No `Authorization: Bearer` credential on the request
    #[error("missing bearer token")]
    MissingCredential,
    /// Credential present but wrong
    #[error("invalid bearer token")]
    InvalidCredential,
}

/// Credential check in front of the `/mcp` endpoint.
///
/// Holds only an SHA-256 digest of the expected token, never the token
/// itself; authentication compares digests.
#[derive(Clone)]
pub struct AccessGate {
    expected_digest: Option<[u8; 32]>,
}

impl AccessGate {
    /// Build a gate for the given expected token. `None` or an empty string
    /// produces a gate that refuses everything with `Misconfigured`.
    pub fn new(token: Option<&str>) -> Self {
        let expected_digest = token.filter(|t| !t.is_empty()).map(digest);
        Self { expected_digest }
    }

    /// Check the request's `Authorization` header against the expected token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let expected = self.expected_digest.ok_or(AuthError::Misconfigured)?;
        let presented = bearer_token(headers).ok_or(AuthError::MissingCredential)?;
        if digest(presented) == expected {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

fn digest(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}
