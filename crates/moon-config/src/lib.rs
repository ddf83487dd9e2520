//! Configuration management for Moon.
//!
//! Parses `moon.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `assets.public_dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the public directory.
    pub public_dir: Option<PathBuf>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "moon.toml";

/// Default public directory, relative to the project.
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Asset configuration (paths are relative strings from TOML).
    assets: AssetsConfigRaw,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Resolved asset configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    public_dir: Option<String>,
}

/// Resolved asset configuration with absolute paths.
#[derive(Debug, Default)]
pub struct AssetsConfig {
    /// Project root (directory of `moon.toml`).
    pub project_dir: PathBuf,
    /// Directory served at the site root and watched for changes.
    pub public_dir: PathBuf,
}

impl AssetsConfig {
    /// Name of the public directory, as it appears in changed file paths.
    #[must_use]
    pub fn public_dir_name(&self) -> String {
        self.public_dir
            .file_name()
            .map_or_else(|| DEFAULT_PUBLIC_DIR.to_owned(), |n| n.to_string_lossy().into_owned())
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
    /// Glob patterns, relative to the public directory, to watch.
    pub watch_patterns: Vec<String>,
    /// Quiet period before a change is broadcast.
    pub debounce_ms: u64,
    /// How long clients wait for a replacement stylesheet to load.
    ///
    /// Not used by the server itself. Applications embedding
    /// `moon_reload::LiveReloadClient` pick it up through
    /// `moon_server::client_config_from_moon_config`.
    pub stylesheet_timeout_ms: u64,
    /// Extensions refreshed in place as stylesheets.
    pub stylesheet_extensions: Vec<String>,
    /// Extensions refreshed in place as images.
    pub image_extensions: Vec<String>,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watch_patterns: vec!["**/*".to_owned()],
            debounce_ms: 100,
            stylesheet_timeout_ms: 5000,
            stylesheet_extensions: ["css", "styl", "less", "scss", "sass"]
                .map(str::to_owned)
                .to_vec(),
            image_extensions: ["png", "jpg", "gif"].map(str::to_owned).to_vec(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`MOON_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `moon.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(public_dir) = &settings.public_dir {
            self.assets_resolved.public_dir = self.assets_resolved.project_dir.join(public_dir);
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            assets: AssetsConfigRaw::default(),
            live_reload: LiveReloadConfig::default(),
            assets_resolved: AssetsConfig {
                project_dir: base.to_path_buf(),
                public_dir: base.join(DEFAULT_PUBLIC_DIR),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values. Called automatically after loading from file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_live_reload()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        let live_reload = &self.live_reload;

        if live_reload.watch_patterns.is_empty() {
            return Err(ConfigError::Validation(
                "live_reload.watch_patterns cannot be empty".to_owned(),
            ));
        }
        if live_reload.stylesheet_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "live_reload.stylesheet_timeout_ms must be greater than 0".to_owned(),
            ));
        }

        let extensions = live_reload
            .stylesheet_extensions
            .iter()
            .map(|ext| (ext, "live_reload.stylesheet_extensions"))
            .chain(
                live_reload
                    .image_extensions
                    .iter()
                    .map(|ext| (ext, "live_reload.image_extensions")),
            );
        for (ext, field) in extensions {
            require_non_empty(ext, field)?;
            if ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "{field}: extension {ext:?} must not contain a dot"
                )));
            }
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref dir) = self.assets.public_dir {
            self.assets.public_dir = Some(expand::expand_env(dir, "assets.public_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.assets_resolved = AssetsConfig {
            project_dir: config_dir.to_path_buf(),
            public_dir: config_dir.join(
                self.assets
                    .public_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_PUBLIC_DIR),
            ),
        };
    }
}
