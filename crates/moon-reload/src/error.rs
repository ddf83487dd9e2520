//! Error types for the live reload client.

use moon_dom::DomError;
use serde_json::Value;

/// Error from handling a notification.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The upstream build failed; callers must treat this as a hard stop.
    #[error("build failed in {file}: {error}")]
    Build {
        /// File that failed to build.
        file: String,
        /// Error payload reported by the build.
        error: Value,
    },

    /// Page mutation failed.
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
