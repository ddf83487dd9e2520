//! `moon serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use moon_config::{CliSettings, Config};
use moon_server::{run_server, server_config_from_moon_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover moon.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve and watch (overrides config).
    #[arg(short = 'd', long, env = "MOON_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "MOON_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "MOON_PORT")]
    port: Option<u16>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Load configuration and run the server until Ctrl-C.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            live_reload_enabled: self.resolve_live_reload_enabled(),
            host: self.host,
            port: self.port,
            public_dir: self.public_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let host = &config.server.host;
        let port = config.server.port;
        output.title("Moon development server");
        if let Some(path) = &config.config_path {
            output.field("Config", path.display());
        }
        output.field("Public directory", config.assets_resolved.public_dir.display());
        output.field("Listening on", format!("http://{host}:{port}"));
        if config.live_reload.enabled {
            output.field_on("Live reload", format!("ws://{host}:{port}/sio"));
        } else {
            output.field("Live reload", "disabled");
        }

        run_server(server_config_from_moon_config(&config)).await?;
        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}
