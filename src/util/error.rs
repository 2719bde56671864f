// laralog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every error names the subsystem and the path it concerns, and keeps the
// underlying cause reachable through `source()`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all laralog operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LaralogError {
    /// Log file discovery failed.
    Discovery(DiscoveryError),

    /// Log file parsing failed.
    Parse(ParseError),

    /// A search request failed.
    Search(SearchError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LaralogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Search(e) => write!(f, "Search error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LaralogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to log file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The log directory does not exist.
    RootNotFound { path: PathBuf },

    /// The log path exists but is not a directory.
    NotADirectory { path: PathBuf },

    /// The log directory exists but no file matched the configured patterns.
    NoLogFiles { path: PathBuf },

    /// A filename glob pattern could not be compiled.
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// Walkdir traversal error.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Metadata for an explicit file could not be read.
    Metadata { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log path '{}' is not a directory", path.display())
            }
            Self::NoLogFiles { path } => write!(
                f,
                "No log files found in '{}'. Check [logs] path and patterns in config.",
                path.display()
            ),
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid log file pattern '{pattern}': {source}")
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "Cannot read metadata for '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            Self::Metadata { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LaralogError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors related to reading a log file.
///
/// Malformed lines are never errors; they are folded into the current entry
/// or discarded by the parser.
#[derive(Debug)]
pub enum ParseError {
    /// I/O error while opening or reading a log file.
    Io { file: PathBuf, source: io::Error },

    /// The caller's cancel flag was raised while the file was being read.
    Cancelled { file: PathBuf },
}

impl ParseError {
    /// Path of the file the error concerns.
    pub fn file(&self) -> &PathBuf {
        match self {
            Self::Io { file, .. } | Self::Cancelled { file } => file,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => {
                write!(f, "'{}': failed to read log file: {source}", file.display())
            }
            Self::Cancelled { file } => {
                write!(f, "'{}': parsing cancelled", file.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

impl From<ParseError> for LaralogError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Search errors
// ---------------------------------------------------------------------------

/// Errors related to a search request.
#[derive(Debug)]
pub enum SearchError {
    /// One candidate file could not be parsed; the whole search is aborted.
    File { file: PathBuf, source: ParseError },

    /// The caller's cancel flag was raised.
    Cancelled { files_completed: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { file, source } => {
                write!(f, "search aborted at '{}': {source}", file.display())
            }
            Self::Cancelled { files_completed } => {
                write!(f, "search cancelled after {files_completed} file(s)")
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

impl From<SearchError> for LaralogError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LaralogError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LaralogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for laralog results.
pub type Result<T> = std::result::Result<T, LaralogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_display_names_path() {
        let err = ParseError::Io {
            file: PathBuf::from("/var/log/laravel.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/log/laravel.log"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_search_error_chains_to_io_cause() {
        let file = PathBuf::from("a.log");
        let err: LaralogError = SearchError::File {
            file: file.clone(),
            source: ParseError::Io {
                file,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
        }
        .into();

        let search = err.source().expect("search cause");
        let parse = search.source().expect("parse cause");
        let io = parse.source().expect("io cause");
        assert!(io.to_string().contains("denied"));
    }
}
