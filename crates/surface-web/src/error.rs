//! Request-level error taxonomy.
//!
//! Everything the inspection endpoint can refuse, in the order the
//! pipeline checks it: size, JSON syntax, document markers, model load,
//! and a catch-all whose detail is logged server-side only.

use surface_projection::LoadError;
use thiserror::Error;

/// Payload ceiling for inspection requests, enforced before parsing.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum InspectError {
    /// Body exceeds the payload ceiling (by header or by measured length).
    #[error("request body is {bytes} bytes; the limit is 10485760 bytes (10 MiB)")]
    TooLarge { bytes: usize },

    /// The text is not JSON at all.
    #[error("invalid JSON: {0}")]
    MalformedJson(serde_json::Error),

    /// Parses as JSON but is not an API surface document.
    #[error("not an API surface document: {0}")]
    InvalidDocument(#[source] LoadError),

    /// The document carries the markers but its content failed to load.
    #[error("could not load the API model: {0}")]
    LoadFailed(#[source] LoadError),

    /// Anything unexpected; the client sees only an opaque message.
    #[error("internal error while building the tree")]
    Internal,
}

impl InspectError {
    /// Short machine-readable code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "TOO_LARGE",
            Self::MalformedJson(_) => "MALFORMED_JSON",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::LoadFailed(_) => "LOAD_FAILED",
            Self::Internal => "INTERNAL",
        }
    }

    /// The one short message the client receives.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Log the failure server-side. Internal causes never reach the
    /// client, so they are logged at error level here.
    pub fn log(&self) {
        match self {
            Self::Internal => tracing::error!(code = self.code(), "inspection failed"),
            Self::LoadFailed(cause) => {
                tracing::warn!(code = self.code(), %cause, "inspection rejected")
            }
            other => tracing::debug!(code = other.code(), "inspection rejected: {other}"),
        }
    }
}
