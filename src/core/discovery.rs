// laralog - core/discovery.rs
//
// Locates log files inside a project's log directory.
//
// Reads only file *metadata* (size, mtime), never file contents. The walk is
// one level deep: frameworks write every channel directly into the log
// directory. Per-file I/O errors are non-fatal and collected as warnings.

use crate::core::model::{LogFile, LogFileType};
use crate::util::constants;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Where to look and which filenames count as logs.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Log directory, relative to the project root (or absolute).
    pub log_path: String,

    /// Filename glob patterns; a file matching any of them is included.
    pub patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            log_path: constants::DEFAULT_LOG_PATH.to_string(),
            patterns: constants::DEFAULT_LOG_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover log files under `root/<log_path>`, newest modification first.
///
/// # Non-fatal errors
/// Entries whose metadata cannot be read are skipped and described in the
/// returned warnings vector.
///
/// # Fatal errors
/// `RootNotFound` / `NotADirectory` for a bad log directory,
/// `InvalidPattern` for a pattern that does not compile, and `NoLogFiles`
/// when nothing matched.
pub fn discover_log_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<LogFile>, Vec<String>), DiscoveryError> {
    let base = root.join(&config.log_path);

    match std::fs::metadata(&base) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(DiscoveryError::NotADirectory { path: base }),
        Err(_) => return Err(DiscoveryError::RootNotFound { path: base }),
    }

    let patterns = compile_patterns(&config.patterns)?;

    tracing::debug!(
        dir = %base.display(),
        patterns = ?config.patterns,
        "Discovery starting"
    );

    let mut files: Vec<LogFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(&base)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map_or_else(|| base.clone(), Path::to_path_buf);
                let msg = DiscoveryError::Traversal { path, source: e }.to_string();
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
            continue;
        };

        if !patterns.iter().any(|p| p.matches(file_name)) {
            tracing::trace!(file = file_name, "Not matched by log patterns");
            continue;
        }

        match log_file_from_metadata(path, entry.metadata().map_err(std::io::Error::from)) {
            Ok(file) => files.push(file),
            Err(e) => {
                let msg = e.to_string();
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
            }
        }
    }

    if files.is_empty() {
        return Err(DiscoveryError::NoLogFiles { path: base });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));

    tracing::debug!(
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

/// Metadata for one explicitly named file.
pub fn file_metadata(path: &Path) -> Result<LogFile, DiscoveryError> {
    log_file_from_metadata(path, std::fs::metadata(path))
}

fn log_file_from_metadata(
    path: &Path,
    metadata: std::io::Result<std::fs::Metadata>,
) -> Result<LogFile, DiscoveryError> {
    let to_error = |source| DiscoveryError::Metadata {
        path: path.to_path_buf(),
        source,
    };
    let metadata = metadata.map_err(to_error)?;
    let modified: DateTime<Utc> = metadata.modified().map_err(to_error)?.into();

    Ok(LogFile {
        path: path.to_path_buf(),
        size: metadata.len(),
        modified,
        file_type: detect_file_type(path),
    })
}

/// Infer how a log file was produced from its filename.
pub fn detect_file_type(path: &Path) -> LogFileType {
    static DAILY: OnceLock<Regex> = OnceLock::new();
    let daily = DAILY.get_or_init(|| {
        Regex::new(r"laravel-[0-9]{4}-[0-9]{2}-[0-9]{2}\.log")
            .expect("detect_file_type: invalid regex")
    });

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if name == constants::SINGLE_LOG_FILE_NAME {
        LogFileType::Single
    } else if daily.is_match(name) {
        LogFileType::Daily
    } else if name
        .strip_suffix(".log")
        .is_some_and(|stem| constants::ENVIRONMENT_LOG_NAMES.contains(&stem))
    {
        LogFileType::Environment
    } else {
        LogFileType::Custom
    }
}

// =============================================================================
// Glob helpers
// =============================================================================

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, DiscoveryError> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|source| DiscoveryError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_with_mtime(path: &Path, content: &str, secs_ago: u64) {
        fs::write(path, content).expect("write log");
        let file = fs::File::options().write(true).open(path).expect("open log");
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .expect("set mtime");
    }

    const SINGLE_LOG: &str = "[2024-01-01 12:00:00] local.INFO: a\n";

    fn make_project() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let logs = dir.path().join("storage").join("logs");
        fs::create_dir_all(&logs).expect("mkdir logs");

        write_with_mtime(&logs.join("laravel.log"), SINGLE_LOG, 300);
        write_with_mtime(&logs.join("laravel-2024-01-02.log"), "x", 100);
        write_with_mtime(&logs.join("staging.log"), "x", 200);
        fs::write(logs.join(".gitignore"), "*\n").expect("write gitignore");
        fs::write(logs.join("notes.txt"), "not a log\n").expect("write notes");

        let nested = logs.join("archive");
        fs::create_dir(&nested).expect("mkdir archive");
        fs::write(nested.join("old.log"), "x").expect("write nested");

        dir
    }

    fn names(files: &[LogFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_discovers_log_files_newest_first() {
        let dir = make_project();
        let (files, warnings) = discover_log_files(dir.path(), &DiscoveryConfig::default()).unwrap();

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(
            names(&files),
            ["laravel-2024-01-02.log", "staging.log", "laravel.log"]
        );
        assert_eq!(files[2].file_type, LogFileType::Single);
        assert_eq!(files[2].size, SINGLE_LOG.len() as u64);
    }

    #[test]
    fn test_patterns_restrict_matches() {
        let dir = make_project();
        let config = DiscoveryConfig {
            patterns: vec!["laravel-*.log".to_string()],
            ..Default::default()
        };
        let (files, _) = discover_log_files(dir.path(), &config).unwrap();
        assert_eq!(names(&files), ["laravel-2024-01-02.log"]);
        assert_eq!(files[0].file_type, LogFileType::Daily);
    }

    #[test]
    fn test_no_matching_files_is_discovery_error() {
        let dir = make_project();
        let config = DiscoveryConfig {
            patterns: vec!["*.json".to_string()],
            ..Default::default()
        };
        let result = discover_log_files(dir.path(), &config);
        assert!(matches!(result, Err(DiscoveryError::NoLogFiles { .. })));
    }

    #[test]
    fn test_missing_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_log_files(dir.path(), &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_log_path_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logs"), "file").unwrap();
        let config = DiscoveryConfig {
            log_path: "logs".to_string(),
            ..Default::default()
        };
        let result = discover_log_files(dir.path(), &config);
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let dir = make_project();
        let config = DiscoveryConfig {
            patterns: vec!["[".to_string()],
            ..Default::default()
        };
        let result = discover_log_files(dir.path(), &config);
        assert!(matches!(result, Err(DiscoveryError::InvalidPattern { .. })));
    }

    #[test]
    fn test_detect_file_type() {
        let t = |name: &str| detect_file_type(&PathBuf::from("/logs").join(name));
        assert_eq!(t("laravel.log"), LogFileType::Single);
        assert_eq!(t("laravel-2024-03-09.log"), LogFileType::Daily);
        assert_eq!(t("laravel-2024-3-9.log"), LogFileType::Custom);
        assert_eq!(t("app-laravel-2024-01-15.log"), LogFileType::Daily);
        assert_eq!(t("production.log"), LogFileType::Environment);
        assert_eq!(t("local.log"), LogFileType::Environment);
        assert_eq!(t("worker.log"), LogFileType::Custom);
    }

    #[test]
    fn test_file_metadata_for_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("development.log");
        fs::write(&path, "hello").unwrap();

        let file = file_metadata(&path).unwrap();
        assert_eq!(file.size, 5);
        assert_eq!(file.file_type, LogFileType::Environment);

        let missing = file_metadata(&dir.path().join("nope.log"));
        assert!(matches!(missing, Err(DiscoveryError::Metadata { .. })));
    }
}
