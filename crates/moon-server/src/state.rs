//! Shared state for request handlers.

use std::path::PathBuf;

use crate::live_reload::LiveReloadManager;

pub(crate) struct AppState {
    /// Directory served at the site root.
    pub(crate) public_dir: PathBuf,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
}
