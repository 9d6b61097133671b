//! Configuration management for DX.
//!
//! Parses `dx.toml` configuration files with serde and provides
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
//! - `update.command` (every element)

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use dx_tree::{DEFAULT_EXTENSIONS, DEFAULT_IGNORE_DIRS, SiblingOrder};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override filesystem watching.
    pub watch: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "dx.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Document root configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Render cache configuration.
    pub cache: CacheConfig,
    /// Search configuration (snapshot path is a relative string from TOML).
    search: SearchConfigRaw,
    /// Content update configuration.
    pub update: UpdateConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved search configuration (set after loading).
    #[serde(skip)]
    pub search_resolved: SearchConfig,
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
            port: 8910,
        }
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    index: Option<String>,
    names_file: Option<String>,
    ignore_dirs: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    skip_hidden: Option<bool>,
    sibling_order: Option<SiblingOrder>,
    watch: Option<bool>,
}

/// Resolved document root configuration.
#[derive(Debug)]
pub struct DocsConfig {
    /// Document root.
    pub source_dir: PathBuf,
    /// Document `/` redirects to, relative to the document root.
    pub index: String,
    /// Name override sidecar.
    pub names_file: PathBuf,
    /// Directory names excluded from the tree and search (default `.git`).
    pub ignore_dirs: Vec<String>,
    /// Accepted document extensions, without the dot.
    pub extensions: Vec<String>,
    /// Also skip every other dot-entry.
    pub skip_hidden: bool,
    pub sibling_order: SiblingOrder,
    /// Rebuild on filesystem changes.
    pub watch: bool,
}

impl DocsConfig {
    fn with_base(base: &Path) -> Self {
        let source_dir = base.join("docs");
        Self {
            names_file: source_dir.join("map.json"),
            source_dir,
            index: "readme.md".to_owned(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|&d| d.to_owned()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            skip_hidden: false,
            sibling_order: SiblingOrder::default(),
            watch: false,
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Render cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of rendered documents kept per generation.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 500 }
    }
}

/// Raw search configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchConfigRaw {
    match_depth: Option<usize>,
    match_width: Option<usize>,
    max_results: Option<usize>,
    snapshot: Option<String>,
}

/// Resolved search configuration.
#[derive(Debug)]
pub struct SearchConfig {
    /// Matches shown per full-text snippet.
    pub match_depth: usize,
    /// Characters per snippet window.
    pub match_width: usize,
    /// Results returned per query.
    pub max_results: usize,
    /// Where the search index snapshot is persisted.
    pub snapshot_path: PathBuf,
}

impl SearchConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            match_depth: 2,
            match_width: 120,
            max_results: 20,
            snapshot_path: base.join(".dx").join("search.json"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Content update configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Whether the update endpoint pulls new content before rebuilding.
    pub enabled: bool,
    /// Program and arguments run in the document root.
    pub command: Vec<String>,
    /// Seconds before the update command is killed.
    pub timeout_secs: u64,
}

impl UpdateConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["git".to_owned(), "pull".to_owned()],
            timeout_secs: 60,
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
        /// Error message (e.g., "${`DX_HOST`} not set").
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

/// Require a numeric field to be greater than zero.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dx.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result does not validate.
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
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            // A names file that lived in the old root moves with it.
            if let Ok(rel) = self
                .docs_resolved
                .names_file
                .strip_prefix(&self.docs_resolved.source_dir)
            {
                self.docs_resolved.names_file = source_dir.join(rel);
            }
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(watch) = settings.watch {
            self.docs_resolved.watch = watch;
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            cache: CacheConfig::default(),
            search: SearchConfigRaw::default(),
            update: UpdateConfig::default(),
            docs_resolved: DocsConfig::with_base(base),
            search_resolved: SearchConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        require_positive(self.cache.capacity as u64, "cache.capacity")?;
        self.validate_search()?;
        self.validate_update()?;
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

    fn validate_search(&self) -> Result<(), ConfigError> {
        let search = &self.search_resolved;
        require_positive(search.match_depth as u64, "search.match_depth")?;
        require_positive(search.match_width as u64, "search.match_width")?;
        require_positive(search.max_results as u64, "search.max_results")?;
        Ok(())
    }

    fn validate_update(&self) -> Result<(), ConfigError> {
        match self.update.command.first() {
            None => {
                return Err(ConfigError::Validation(
                    "update.command cannot be empty".to_owned(),
                ));
            }
            Some(program) => require_non_empty(program, "update.command")?,
        }
        require_positive(self.update.timeout_secs, "update.timeout_secs")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        for arg in &mut self.update.command {
            *arg = expand::expand_env(arg, "update.command")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// The names file is resolved against the document root, the snapshot
    /// against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let docs = &self.docs;
        let source_dir = config_dir.join(docs.source_dir.as_deref().unwrap_or("docs"));
        let names_file = source_dir.join(docs.names_file.as_deref().unwrap_or("map.json"));
        let defaults = DocsConfig::with_base(config_dir);

        self.docs_resolved = DocsConfig {
            source_dir,
            index: docs.index.clone().unwrap_or(defaults.index),
            names_file,
            ignore_dirs: docs.ignore_dirs.clone().unwrap_or(defaults.ignore_dirs),
            extensions: docs.extensions.clone().unwrap_or(defaults.extensions),
            skip_hidden: docs.skip_hidden.unwrap_or(defaults.skip_hidden),
            sibling_order: docs.sibling_order.unwrap_or(defaults.sibling_order),
            watch: docs.watch.unwrap_or(defaults.watch),
        };

        let search = &self.search;
        let defaults = SearchConfig::with_base(config_dir);
        self.search_resolved = SearchConfig {
            match_depth: search.match_depth.unwrap_or(defaults.match_depth),
            match_width: search.match_width.unwrap_or(defaults.match_width),
            max_results: search.max_results.unwrap_or(defaults.max_results),
            snapshot_path: search
                .snapshot
                .as_deref()
                .map_or(defaults.snapshot_path, |s| config_dir.join(s)),
        };
    }
}
