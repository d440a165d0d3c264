// src/error.rs
// =============================================================================
// Error types for the model registry core.
//
// Every failure the core can produce is one variant of RegistryError.
// Errors are plain values: they travel up through the cache layer to
// whoever called it, carrying a human-readable message. Nothing in the core
// retries.
//
// Rust concepts:
// - thiserror: derive macro that writes the Display and Error impls for us
// - From conversions: let `?` turn a reqwest::Error into a RegistryError
// =============================================================================

use thiserror::Error;

// Errors that can occur while fetching or parsing the model registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    // No repository coordinates are active
    #[error("GitHub not configured")]
    NotConfigured,

    // The config file exists but has no bytes in it
    #[error("empty config file")]
    EmptyConfig,

    // Unparseable document or wrong top-level shape
    #[error("{0}")]
    InvalidFormat(String),

    // Upstream 404; message is token-aware
    #[error("{0}")]
    NotFound(String),

    // Upstream 401
    #[error("invalid GitHub token: {0}")]
    InvalidToken(String),

    // Upstream 403
    #[error("access denied: {0}")]
    AccessDenied(String),

    // Any other non-2xx status, a transport failure, or an unreadable body
    #[error("{0}")]
    Upstream(String),

    // The `content` field was not valid base64
    #[error("failed to decode file content: {0}")]
    Decode(String),
}

// A type alias so the core can write Result<T> instead of
// Result<T, RegistryError> everywhere
pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    // Wrong top-level shape. Same message for JSON and YAML.
    pub fn not_an_array() -> Self {
        Self::InvalidFormat("config file must contain an array of models".to_string())
    }

    // Non-200 response that isn't 401/403/404
    pub fn upstream_status(status: u16, message: &str) -> Self {
        Self::Upstream(format!("GitHub API error {}: {}", status, message))
    }

    // True for the variants a caller should treat as "missing"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// Transport errors (DNS, refused connection, the 15 second timeout, ...)
// all surface as Upstream errors
impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Upstream(format!("failed to reach GitHub API: request timed out ({})", err))
        } else {
            Self::Upstream(format!("failed to reach GitHub API: {}", err))
        }
    }
}
