// laralog - platform/config.rs
//
// Platform configuration directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::discovery::DiscoveryConfig;
use crate::core::search::{FailurePolicy, SearchOptions};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for laralog configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/laralog/ or %APPDATA%\laralog\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[logs]` section.
    pub logs: LogsSection,
    /// `[search]` section.
    pub search: SearchSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[logs]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LogsSection {
    /// Log directory relative to the project root.
    pub path: Option<String>,
    /// Filename glob patterns.
    pub patterns: Option<Vec<String>>,
}

/// `[search]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Maximum entries per search or load.
    pub max_entries: Option<usize>,
    /// Number of cached search results.
    pub cache_capacity: Option<usize>,
    /// Continue past unreadable files instead of failing the search.
    pub skip_unreadable_files: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    // -- Logs --
    pub log_path: String,
    pub log_patterns: Vec<String>,

    // -- Search --
    pub max_entries: usize,
    pub cache_capacity: usize,
    pub skip_unreadable_files: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let discovery = DiscoveryConfig::default();
        Self {
            log_path: discovery.log_path,
            log_patterns: discovery.patterns,
            max_entries: constants::DEFAULT_MAX_ENTRIES,
            cache_capacity: constants::DEFAULT_CACHE_CAPACITY,
            skip_unreadable_files: false,
            log_level: None,
        }
    }
}

impl AppConfig {
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            log_path: self.log_path.clone(),
            patterns: self.log_patterns.clone(),
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            cache_capacity: self.cache_capacity,
            failure_policy: if self.skip_unreadable_files {
                FailurePolicy::SkipFailing
            } else {
                FailurePolicy::Abort
            },
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_from(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load and validate an explicit config file.
///
/// Unlike `load_config`, a missing or unparseable file is an error. Out of
/// range values are still reported as warnings.
pub fn load_config_from(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

/// Validate each field against named constants, accumulating all warnings.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Logs: path --
    if let Some(path) = raw.logs.path {
        if path.trim().is_empty() {
            warnings.push(out_of_range(
                "logs.path",
                "",
                format!("a non-empty directory. Using default ({}).", config.log_path),
            ));
        } else {
            config.log_path = path;
        }
    }

    // -- Logs: patterns --
    if let Some(patterns) = raw.logs.patterns {
        let patterns: Vec<String> = patterns.into_iter().filter(|p| !p.is_empty()).collect();
        if patterns.is_empty() {
            warnings.push(out_of_range(
                "logs.patterns",
                "[]",
                "at least one glob pattern. Using defaults.".to_string(),
            ));
        } else {
            config.log_patterns = patterns;
        }
    }

    // -- Search: max_entries --
    if let Some(max) = raw.search.max_entries {
        if (constants::MIN_MAX_ENTRIES..=constants::ABSOLUTE_MAX_ENTRIES).contains(&max) {
            config.max_entries = max;
        } else {
            warnings.push(out_of_range(
                "search.max_entries",
                max,
                format!(
                    "{}-{}. Using default ({})",
                    constants::MIN_MAX_ENTRIES,
                    constants::ABSOLUTE_MAX_ENTRIES,
                    constants::DEFAULT_MAX_ENTRIES,
                ),
            ));
        }
    }

    // -- Search: cache_capacity --
    if let Some(capacity) = raw.search.cache_capacity {
        if (constants::MIN_CACHE_CAPACITY..=constants::ABSOLUTE_MAX_CACHE_CAPACITY)
            .contains(&capacity)
        {
            config.cache_capacity = capacity;
        } else {
            warnings.push(out_of_range(
                "search.cache_capacity",
                capacity,
                format!(
                    "{}-{}. Using default ({})",
                    constants::MIN_CACHE_CAPACITY,
                    constants::ABSOLUTE_MAX_CACHE_CAPACITY,
                    constants::DEFAULT_CACHE_CAPACITY,
                ),
            ));
        }
    }

    if let Some(skip) = raw.search.skip_unreadable_files {
        config.skip_unreadable_files = skip;
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(out_of_range(
                "logging.level",
                &level,
                format!(
                    "one of {}. Using default ({})",
                    constants::VALID_LOG_LEVELS.join(", "),
                    constants::DEFAULT_LOG_LEVEL,
                ),
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}
