//! Server error types.

use std::path::PathBuf;

/// Error starting or running the development server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The public directory does not exist.
    #[error("Public directory not found: {}", .0.display())]
    PublicDirNotFound(PathBuf),

    /// The file watcher could not be started.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
