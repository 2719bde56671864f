// laralog - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "laralog";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "laralog";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery defaults
// =============================================================================

/// Log directory relative to the project root.
pub const DEFAULT_LOG_PATH: &str = "storage/logs";

/// Filename glob patterns matched inside the log directory.
pub const DEFAULT_LOG_PATTERNS: &[&str] = &["laravel.log", "laravel-*.log", "*.log"];

/// Filename of the single-file log channel.
pub const SINGLE_LOG_FILE_NAME: &str = "laravel.log";

/// Environment names recognised as per-environment log files (`<env>.log`).
pub const ENVIRONMENT_LOG_NAMES: &[&str] = &["local", "production", "staging", "development"];

// =============================================================================
// Parsing
// =============================================================================

/// Environment assigned to header lines that carry no environment token.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Marker text (compared case-insensitively) that opens a stack-trace block.
pub const STACK_TRACE_MARKER: &str = "stack trace:";

/// Buffer size for line-at-a-time log file reads.
pub const READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// Per-file parse cap multiplier applied by the search engine so filtering
/// still leaves enough candidates to fill the final result cap.
pub const PARSE_SLACK_FACTOR: usize = 2;

// =============================================================================
// Search limits
// =============================================================================

/// Default maximum entries returned by a search or load.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// Minimum user-configurable entry cap.
pub const MIN_MAX_ENTRIES: usize = 1;

/// Maximum user-configurable entry cap.
pub const ABSOLUTE_MAX_ENTRIES: usize = 100_000;

/// Default number of cached search results.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Minimum user-configurable cache capacity.
pub const MIN_CACHE_CAPACITY: usize = 1;

/// Maximum user-configurable cache capacity.
pub const ABSOLUTE_MAX_CACHE_CAPACITY: usize = 10_000;

// =============================================================================
// Configuration and logging
// =============================================================================

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default tracing filter when neither RUST_LOG, --debug nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
