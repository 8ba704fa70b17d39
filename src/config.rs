//! Configuration management for brainbase using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, StoreError};
use crate::rate_limit::RateLimitConfig;
use crate::repository::DbContext;
use crate::sampling::{
    DEFAULT_QUANTITY, DEFAULT_REFRESH_INTERVAL, DEFAULT_WINDOW_SIZE, MAX_QUANTITY,
};
use crate::search::{
    ElasticsearchIndex, DEFAULT_INDEX_NAME, DEFAULT_INDEX_TIMEOUT, DEFAULT_SEARCH_URL,
};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "brainbase.db";

/// Default bound on a single store call, in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    /// Supports sqlite: URLs. Set via DATABASE_URL env var or config.
    pub database_url: Option<String>,
    /// Per-call store timeout in seconds.
    pub store_timeout_secs: u64,
    /// Base URL of the search index.
    pub search_url: String,
    /// Name of the question index.
    pub search_index: String,
    /// Search index request timeout in seconds.
    pub search_timeout_secs: u64,
    /// Rows fetched per sampling window.
    pub window_size: u64,
    /// Seconds between count cache refreshes.
    pub refresh_interval_secs: u64,
    /// Largest quantity a caller may request.
    pub max_quantity: u32,
    /// Quantity used when none is given.
    pub default_quantity: u32,
    /// Requests per client address per rate limit period.
    pub rate_limit_requests: u32,
    /// Rate limit period in seconds.
    pub rate_limit_period_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/Documents/brainbase/ for user data
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brainbase");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            store_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            search_index: DEFAULT_INDEX_NAME.to_string(),
            search_timeout_secs: DEFAULT_INDEX_TIMEOUT.as_secs(),
            window_size: DEFAULT_WINDOW_SIZE,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            max_quantity: MAX_QUANTITY,
            default_quantity: DEFAULT_QUANTITY,
            rate_limit_requests: 10,
            rate_limit_period_secs: 60,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Check if using an explicit database URL (vs file path).
    pub fn has_database_url(&self) -> bool {
        self.database_url.is_some()
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        if self.has_database_url() {
            true
        } else {
            self.database_path().exists()
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            self.rate_limit_requests,
            Duration::from_secs(self.rate_limit_period_secs.max(1)),
        )
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> Result<DbContext, StoreError> {
        Ok(DbContext::from_url(&self.database_url())?.with_timeout(self.store_timeout()))
    }

    /// Create a database context and verify the connection works.
    pub async fn create_db_context_validated(&self) -> Result<DbContext, String> {
        let ctx = self
            .create_db_context()
            .map_err(|e| format!("Failed to create database context: {}", e))?;
        ctx.test_connection()
            .await
            .map_err(|e| format!("Failed to connect to database: {}", e))?;
        Ok(ctx)
    }

    /// Create the search index client.
    pub fn create_search_index(&self) -> Result<ElasticsearchIndex, IndexError> {
        ElasticsearchIndex::new(
            &self.search_url,
            &self.search_index,
            Duration::from_secs(self.search_timeout_secs.max(1)),
        )
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_timeout_secs: Option<u64>,
    /// Search index base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_timeout_secs: Option<u64>,
    /// Rows per sampling window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_size: Option<u64>,
    /// Seconds between count refreshes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_quantity: Option<u32>,
    /// Requests per client per period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_requests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_period_secs: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers brainbase config files in standard locations.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("brainbase").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("Ignoring config {}: {}", path.display(), e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found, use defaults
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(timeout) = self.store_timeout_secs {
            settings.store_timeout_secs = timeout;
        }
        if let Some(ref url) = self.search_url {
            settings.search_url = url.clone();
        }
        if let Some(ref index) = self.search_index {
            settings.search_index = index.clone();
        }
        if let Some(timeout) = self.search_timeout_secs {
            settings.search_timeout_secs = timeout;
        }
        if let Some(window_size) = self.window_size {
            settings.window_size = window_size;
        }
        if let Some(interval) = self.refresh_interval_secs {
            settings.refresh_interval_secs = interval;
        }
        if let Some(max) = self.max_quantity {
            settings.max_quantity = max;
        }
        if let Some(default) = self.default_quantity {
            settings.default_quantity = default;
        }
        if let Some(requests) = self.rate_limit_requests {
            settings.rate_limit_requests = requests;
        }
        if let Some(period) = self.rate_limit_period_secs {
            settings.rate_limit_period_secs = period;
        }
        // A default above the maximum would make every bare request invalid
        settings.default_quantity = settings
            .default_quantity
            .clamp(1, settings.max_quantity.max(1));
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--data flag).
    /// Can be a directory containing brainbase.db or a .db file directly.
    pub data: Option<PathBuf>,
}

fn is_db_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Look for a config file next to the database.
fn find_config_next_to_db(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "yaml", "yml", "json"];
    let basenames = ["brainbase", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions, data_dir_override: Option<&PathBuf>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring config {}: {}", config_path.display(), e);
                Config::default()
            });
    }

    // Priority 2: Config next to data dir
    if let Some(data_dir) = data_dir_override {
        if let Some(config_path) = find_config_next_to_db(data_dir) {
            tracing::debug!("Found config next to data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_default();
        }
    }

    // Priority 3: Auto-discover via prefer
    Config::load().await
}

/// Apply environment variable overrides, which take highest precedence.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

    if let Some(url) = var("DATABASE_URL") {
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }
    if let Some(url) = var("SEARCH_URL") {
        tracing::debug!("Using SEARCH_URL from environment: {}", url);
        settings.search_url = url;
    }
    if let Some(index) = var("SEARCH_INDEX") {
        settings.search_index = index;
    }
    if let Some(secs) = var("REFRESH_INTERVAL_SECS") {
        match secs.parse() {
            Ok(secs) => settings.refresh_interval_secs = secs,
            Err(_) => tracing::warn!("Ignoring invalid REFRESH_INTERVAL_SECS '{}'", secs),
        }
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let data = options.data.as_deref().map(absolute);
    let data_dir_override = data.as_ref().map(|path| {
        if is_db_file(path) {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.clone()
        }
    });

    let config = load_file_config(&options, data_dir_override.as_ref()).await;

    let mut settings = Settings::default();

    // Determine base directory for resolving relative paths
    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data override takes precedence for data_dir and the database file
    if let Some(data_dir) = data_dir_override {
        settings.data_dir = data_dir;
    }
    if let Some(filename) = data
        .as_ref()
        .filter(|path| is_db_file(path))
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
    {
        settings.database_filename = filename.to_string();
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    (settings, config)
}
