//! Development server for Moon.
//!
//! Serves the public directory over HTTP and pushes live reload
//! notifications to browsers:
//!
//! ```text
//! Browser ──HTTP──► axum server (moon-server)
//!                        │
//!                        ├─► GET /sio (WebSocket) ◄── broadcast ◄── LiveReloadManager
//!                        │                                               │
//!                        │                                 notify ──► debouncer
//!                        │
//!                        └─► static files from the public directory
//! ```
//!
//! Each WebSocket text frame is `["_moon", message]` where `message` is a
//! [`moon_reload::Notification`].
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use moon_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         public_dir: PathBuf::from("public"),
//!         ..ServerConfig::default()
//!     };
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moon_reload::ClientConfig;

pub use error::ServerError;
pub use live_reload::LiveReloadManager;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served at the site root and watched for changes.
    pub public_dir: PathBuf,
    /// Project root; changed files are reported relative to it.
    pub project_dir: PathBuf,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Glob patterns, relative to the public directory, to watch.
    pub watch_patterns: Vec<String>,
    /// Quiet period before a change is broadcast.
    pub debounce: Duration,
    /// Asset classification shared with clients.
    ///
    /// The server only reads the extension lists; `stylesheet_timeout` is
    /// carried for embedders that build a `LiveReloadClient` from it.
    pub assets: ClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            project_dir: PathBuf::from("."),
            live_reload_enabled: true,
            watch_patterns: vec!["**/*".to_owned()],
            debounce: Duration::from_millis(100),
            assets: ClientConfig::default(),
        }
    }
}

/// Run the server until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if !config.public_dir.is_dir() {
        return Err(ServerError::PublicDirNotFound(config.public_dir));
    }

    let live_reload = if config.live_reload_enabled {
        let mut manager = LiveReloadManager::new(
            config.public_dir.clone(),
            config.project_dir.clone(),
            &config.watch_patterns,
            config.assets.clone(),
            config.debounce,
        );
        manager.start()?;
        Some(manager)
    } else {
        None
    };

    let state = Arc::new(AppState {
        public_dir: config.public_dir,
        live_reload,
    });
    let app = app::create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Client settings derived from Moon config.
///
/// The result configures both the server's change classifier and any
/// `moon_reload::LiveReloadClient` that should agree with it, including the
/// stylesheet swap timeout.
#[must_use]
pub fn client_config_from_moon_config(config: &moon_config::Config) -> ClientConfig {
    ClientConfig {
        public_dir: config.assets_resolved.public_dir_name(),
        stylesheet_extensions: config.live_reload.stylesheet_extensions.clone(),
        image_extensions: config.live_reload.image_extensions.clone(),
        stylesheet_timeout: Duration::from_millis(config.live_reload.stylesheet_timeout_ms),
    }
}

/// Create server configuration from Moon config.
#[must_use]
pub fn server_config_from_moon_config(config: &moon_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        public_dir: config.assets_resolved.public_dir.clone(),
        project_dir: config.assets_resolved.project_dir.clone(),
        live_reload_enabled: config.live_reload.enabled,
        watch_patterns: config.live_reload.watch_patterns.clone(),
        debounce: Duration::from_millis(config.live_reload.debounce_ms),
        assets: client_config_from_moon_config(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_moon_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 4000

[assets]
public_dir = "static"

[live_reload]
debounce_ms = 300
stylesheet_timeout_ms = 1500
image_extensions = ["png"]
"#,
        )
        .unwrap();
        let config = moon_config::Config::load(Some(&path), None).unwrap();

        let server = server_config_from_moon_config(&config);

        assert_eq!(server.port, 4000);
        assert_eq!(server.public_dir, dir.path().join("static"));
        assert_eq!(server.project_dir, dir.path());
        assert_eq!(server.debounce, Duration::from_millis(300));
        assert_eq!(server.assets.public_dir, "static");
        assert_eq!(server.assets.image_extensions, vec!["png".to_owned()]);
        assert_eq!(server.assets.stylesheet_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_client_config_from_moon_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon.toml");
        std::fs::write(&path, "[live_reload]\nstylesheet_timeout_ms = 250\n").unwrap();
        let config = moon_config::Config::load(Some(&path), None).unwrap();

        let client = client_config_from_moon_config(&config);

        assert_eq!(client.stylesheet_timeout, Duration::from_millis(250));
        assert_eq!(client.public_dir, "public");
        assert_eq!(client.stylesheet_extensions, ClientConfig::default().stylesheet_extensions);
    }

    #[tokio::test]
    async fn test_run_server_requires_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            public_dir: dir.path().join("missing"),
            ..ServerConfig::default()
        };

        let err = run_server(config).await.unwrap_err();
        assert!(matches!(err, ServerError::PublicDirNotFound(_)));
    }
}
