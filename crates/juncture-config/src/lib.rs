//! Configuration management for the Juncture gateway.
//!
//! Parses `juncture.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Content Source Resolution
//!
//! `content.source` is either a hosted repository identifier
//! (`owner/repo`) or a path to a local mirror of one. A configured value that
//! names an existing path resolves to [`ContentConfig::local_dir`]; anything
//! else is treated as a repository identifier. Paths from the config file are
//! resolved against the config file's directory, paths from the CLI against
//! the working directory.
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `content.source`
//! - `render.endpoint`
//! - `assets.script_endpoint`
//! - `search.key`
//! - `search.cx`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Repository published when no content source is configured.
pub const DEFAULT_CONTENT_SOURCE: &str = "juncture-digital/hosting";

/// Rendering service used when none is configured.
pub const DEFAULT_RENDER_ENDPOINT: &str = "https://api.juncture-digital.org";

/// Client-side script bundle referenced by rendered pages.
pub const DEFAULT_SCRIPT_ENDPOINT: &str =
    "https://cdn.jsdelivr.net/npm/juncture-digital/docs/js/index.js";

/// Version tag meaning "do not pin the script bundle".
pub const LATEST_VERSION: &str = "latest";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content source (repository identifier or local path).
    pub content: Option<String>,
    /// Override rendering service endpoint.
    pub render_endpoint: Option<String>,
    /// Override script bundle endpoint.
    pub script_endpoint: Option<String>,
    /// Override script bundle version tag.
    pub version: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "juncture.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration as written in TOML.
    content: ContentConfigRaw,
    /// Rendering service configuration.
    pub render: RenderConfig,
    /// Script/style bundle configuration.
    pub assets: AssetsConfig,
    /// Site search configuration.
    pub search: SearchConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
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
            host: "0.0.0.0".to_owned(),
            port: 8000,
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source: Option<String>,
}

/// Resolved content configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Repository identifier, or the absolute local path as a string.
    pub identifier: String,
    /// Local mirror directory (`None` for a hosted repository).
    pub local_dir: Option<PathBuf>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_CONTENT_SOURCE.to_owned(),
            local_dir: None,
        }
    }
}

impl ContentConfig {
    /// Resolve a configured source against `base`.
    ///
    /// An existing path becomes a local mirror with an absolute root; anything
    /// else is kept as a repository identifier verbatim.
    #[must_use]
    pub fn resolve(source: &str, base: &Path) -> Self {
        let candidate = base.join(source);
        if !source.is_empty() && candidate.exists() {
            let candidate = std::path::absolute(&candidate).unwrap_or(candidate);
            return Self {
                identifier: candidate.to_string_lossy().into_owned(),
                local_dir: Some(candidate),
            };
        }
        Self {
            identifier: source.to_owned(),
            local_dir: None,
        }
    }
}

/// Rendering service configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base URL of the markdown rendering service.
    pub endpoint: String,
    /// Timeout in seconds for every upstream call (`None` uses the client default).
    pub timeout_secs: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RENDER_ENDPOINT.to_owned(),
            timeout_secs: None,
        }
    }
}

/// Script/style bundle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Version tag to pin the bundle to (`"latest"` leaves it unpinned).
    pub version: String,
    /// Script bundle URL to substitute for the default one.
    pub script_endpoint: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION.to_owned(),
            script_endpoint: DEFAULT_SCRIPT_ENDPOINT.to_owned(),
        }
    }
}

/// Site search configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search API key.
    pub key: String,
    /// Search engine identifier.
    pub cx: String,
    /// Maximum number of cached responses (`None` means unbounded).
    pub cache_capacity: Option<usize>,
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
        /// Config field path (e.g., "`search.key`").
        field: String,
        /// Error message (e.g., "${`GOOGLE_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `juncture.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            let cwd = std::env::current_dir().unwrap_or_default();
            config.apply_cli_settings(settings, &cwd);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// A content source given on the command line is resolved against `cwd`.
    fn apply_cli_settings(&mut self, settings: &CliSettings, cwd: &Path) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(content) = &settings.content {
            self.content_resolved = ContentConfig::resolve(content, cwd);
        }
        if let Some(endpoint) = &settings.render_endpoint {
            self.render.endpoint.clone_from(endpoint);
        }
        if let Some(script_endpoint) = &settings.script_endpoint {
            self.assets.script_endpoint.clone_from(script_endpoint);
        }
        if let Some(version) = &settings.version {
            self.assets.version.clone_from(version);
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before content resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_content(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        require_non_empty(&self.content_resolved.identifier, "content.source")?;
        require_non_empty(&self.render.endpoint, "render.endpoint")?;
        require_http_url(&self.render.endpoint, "render.endpoint")?;
        if self.render.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "render.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        self.validate_assets()?;
        if self.search.cache_capacity == Some(0) {
            return Err(ConfigError::Validation(
                "search.cache_capacity must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate bundle configuration.
    fn validate_assets(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.assets.version, "assets.version")?;
        if self.assets.version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "assets.version cannot contain whitespace".to_owned(),
            ));
        }
        require_non_empty(&self.assets.script_endpoint, "assets.script_endpoint")?;
        require_http_url(&self.assets.script_endpoint, "assets.script_endpoint")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref source) = self.content.source {
            self.content.source = Some(expand::expand_env(source, "content.source")?);
        }

        self.render.endpoint = expand::expand_env(&self.render.endpoint, "render.endpoint")?;
        self.assets.script_endpoint =
            expand::expand_env(&self.assets.script_endpoint, "assets.script_endpoint")?;
        self.search.key = expand::expand_env(&self.search.key, "search.key")?;
        self.search.cx = expand::expand_env(&self.search.cx, "search.cx")?;

        Ok(())
    }

    /// Resolve the configured content source against the config directory.
    ///
    /// Without a `content.source` the default hosted repository is kept.
    fn resolve_content(&mut self, config_dir: &Path) {
        self.content_resolved = match self.content.source.as_deref() {
            Some(source) => ContentConfig::resolve(source, config_dir),
            None => ContentConfig::default(),
        };
    }
}
