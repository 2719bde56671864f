// laralog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers and the shape of
// everything that crosses the display boundary as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Log Level
// =============================================================================

/// Severity levels emitted by the framework logger, ordered from least to
/// most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LogLevel {
    /// Returns all variants, least severe first.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Notice,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Critical,
            LogLevel::Alert,
            LogLevel::Emergency,
        ]
    }

    /// Upper-case token as it appears in a header line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Alert => "ALERT",
            LogLevel::Emergency => "EMERGENCY",
        }
    }

    /// Parse a level token case-insensitively. `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<LogLevel> {
        let upper = token.to_uppercase();
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.as_str() == upper)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::from_token(s).ok_or_else(|| {
            let valid: Vec<&str> = LogLevel::all().iter().map(LogLevel::as_str).collect();
            format!("unknown log level '{s}' (expected one of {})", valid.join(", "))
        })
    }
}

/// Returns true if `token` names a known level, ignoring case.
pub fn is_valid_log_level(token: &str) -> bool {
    LogLevel::from_token(token).is_some()
}

// =============================================================================
// Log Entry (output of parsing)
// =============================================================================

/// One call frame reassembled from a `#N file(line): method` trace line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTraceFrame {
    pub file: String,
    pub line: u32,
    pub method: String,
}

/// A single parsed log record.
///
/// Created only by the parser while reading one file; immutable once yielded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// `<file path>:<line number of the header line>`; unique per parse run.
    pub id: String,

    /// Header timestamp. Log files carry no zone, so it is read as UTC.
    pub timestamp: DateTime<Utc>,

    /// Environment token from the header, `production` when absent.
    pub environment: String,

    pub level: LogLevel,

    /// Header message plus any continuation lines, joined with `\n`.
    pub message: String,

    /// Frames from a `Stack trace:` block, in file order. Empty if none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<StackTraceFrame>,

    /// Path to the source log file.
    pub file_path: PathBuf,

    /// 1-based line number of the header line.
    pub line_number: u64,
}

impl LogEntry {
    /// Builds the entry id from its source path and header line number.
    pub fn make_id(file_path: &std::path::Path, line_number: u64) -> String {
        format!("{}:{line_number}", file_path.display())
    }
}

// =============================================================================
// Log File (output of discovery)
// =============================================================================

/// How a log file was produced, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFileType {
    /// `laravel.log`
    Single,
    /// `laravel-YYYY-MM-DD.log`
    Daily,
    /// `local.log`, `production.log`, ...
    Environment,
    /// Anything else matched by the discovery patterns.
    Custom,
}

/// Metadata about a candidate log file. Contents are never read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFile {
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Last modification time. Part of the search cache key, so a file
    /// rewritten without its mtime changing can produce a stale hit.
    pub modified: DateTime<Utc>,

    #[serde(rename = "type")]
    pub file_type: LogFileType,
}
