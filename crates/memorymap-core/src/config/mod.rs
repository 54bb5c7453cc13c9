use crate::error::{MemoryMapError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMapConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded; cancellation
    /// is then the only way to abandon a hung call.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom path for the local key-value store. Defaults to
    /// `~/.config/memorymap/local_storage.json`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_analytics_sink")]
    pub sink: String,
    /// Target file for the `jsonl` sink. Defaults to
    /// `~/.config/memorymap/analytics.jsonl`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sink: default_analytics_sink(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_memories_limit")]
    pub memories_limit: usize,
    #[serde(default = "default_map_entries_limit")]
    pub map_entries_limit: usize,
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            memories_limit: default_memories_limit(),
            map_entries_limit: default_map_entries_limit(),
            default_sort: default_sort(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_emotion")]
    pub default_emotion: String,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            default_emotion: default_emotion(),
        }
    }
}

/// Valid analytics sink names.
pub const VALID_ANALYTICS_SINKS: &[&str] = &["tracing", "jsonl", "none"];

/// Valid memory list sort orders.
pub const VALID_SORTS: &[&str] = &["newest", "oldest", "title"];

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_true() -> bool {
    true
}
fn default_analytics_sink() -> String {
    "tracing".to_string()
}
fn default_memories_limit() -> usize {
    100
}
fn default_map_entries_limit() -> usize {
    50
}
fn default_sort() -> String {
    "newest".to_string()
}
fn default_history_limit() -> usize {
    50
}
fn default_emotion() -> String {
    "NEUTRAL".to_string()
}

impl MemoryMapConfig {
    /// Load configuration with three-layer TOML merge plus environment:
    /// 1. ~/.config/memorymap/config.toml (global)
    /// 2. .memorymap/config.toml (project)
    /// 3. .memorymap/config.local.toml (local, gitignored)
    /// 4. `MEMORYMAP__SECTION__KEY` environment variables
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".memorymap").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".memorymap").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("MEMORYMAP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| MemoryMapError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| MemoryMapError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Defaults only (no files, no environment).
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            analytics: AnalyticsConfig::default(),
            ui: UiConfig::default(),
            quotes: QuotesConfig::default(),
        }
    }

    /// Validate config values, fixing what can be fixed and logging warnings.
    /// Lenient: never rejects the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            warnings.push(format!(
                "api.base_url '{}' is not an http(s) URL, using {}",
                self.api.base_url,
                default_base_url()
            ));
            self.api.base_url = default_base_url();
        } else {
            self.api.base_url = trimmed;
        }

        if self.api.timeout_secs == Some(0) {
            warnings.push("api.timeout_secs = 0, disabling the timeout".to_string());
            self.api.timeout_secs = None;
        }

        if !VALID_ANALYTICS_SINKS.contains(&self.analytics.sink.as_str()) {
            warnings.push(format!(
                "unknown analytics sink '{}', valid: {}; using tracing",
                self.analytics.sink,
                VALID_ANALYTICS_SINKS.join(", ")
            ));
            self.analytics.sink = default_analytics_sink();
        }

        if !VALID_SORTS.contains(&self.ui.default_sort.as_str()) {
            warnings.push(format!(
                "unknown ui.default_sort '{}', valid: {}",
                self.ui.default_sort,
                VALID_SORTS.join(", ")
            ));
            self.ui.default_sort = default_sort();
        }

        let limits: Vec<(&str, &mut usize)> = vec![
            ("ui.memories_limit", &mut self.ui.memories_limit),
            ("ui.map_entries_limit", &mut self.ui.map_entries_limit),
            ("quotes.history_limit", &mut self.quotes.history_limit),
        ];
        for (name, val) in limits {
            if *val == 0 {
                warnings.push(format!("{name} = 0, setting to 1"));
                *val = 1;
            }
        }

        let upper = self.quotes.default_emotion.to_uppercase();
        if crate::model::QuoteEmotion::parse(&upper).is_none() {
            warnings.push(format!(
                "unknown quotes.default_emotion '{}', using NEUTRAL",
                self.quotes.default_emotion
            ));
            self.quotes.default_emotion = default_emotion();
        } else {
            self.quotes.default_emotion = upper;
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }

    /// Resolved path of the local key-value store.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => config_dir_file("local_storage.json"),
        }
    }

    /// Resolved path of the analytics JSONL file.
    pub fn analytics_path(&self) -> Result<PathBuf> {
        match &self.analytics.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => config_dir_file("analytics.jsonl"),
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("memorymap").join("config.toml"))
}

fn config_dir_file(name: &str) -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("memorymap").join(name))
        .ok_or_else(|| MemoryMapError::Config("cannot determine config directory".to_string()))
}
