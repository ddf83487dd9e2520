//! CLI error types.

use moon_config::ConfigError;
use moon_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
