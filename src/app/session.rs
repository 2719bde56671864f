// laralog - app/session.rs
//
// One viewing session over a project's logs: owns the validated config, the
// search engine (and therefore its result cache), the project root, and the
// most recently discovered file list.
//
// Operations mirror what a log viewer front end exposes:
//   - discover: list log files (newest modification first)
//   - load:     the unfiltered "latest entries" view
//   - search:   filtered, cached query
//   - refresh:  drop cached results and re-discover
//   - locate:   file + line pair for an external editor

use crate::core::discovery::{discover_log_files, file_metadata};
use crate::core::model::{LogEntry, LogFile};
use crate::core::parser::{parse_file, LogOpener};
use crate::core::query::{SearchQuery, SearchResult};
use crate::core::search::{FailurePolicy, SearchEngine};
use crate::platform::config::AppConfig;
use crate::platform::fs::FsOpener;
use crate::util::error::{LaralogError, SearchError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Where an entry lives on disk; what an "open in editor" action needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLocation {
    pub path: PathBuf,
    /// 1-based line of the entry's header.
    pub line: u64,
}

/// Result of `LogSession::load`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedLogs {
    /// Newest first, at most `max_entries`.
    pub entries: Vec<LogEntry>,
    /// Entries parsed across all files before truncation.
    pub total: usize,
    pub files_loaded: usize,
    pub files_failed: usize,
    #[serde(rename = "executionTimeMs", serialize_with = "serialize_ms")]
    pub execution_time: Duration,
}

fn serialize_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

pub struct LogSession<O = FsOpener> {
    root: PathBuf,
    config: AppConfig,
    engine: SearchEngine<O>,
    files: Vec<LogFile>,
    warnings: Vec<String>,
}

impl LogSession<FsOpener> {
    /// Session reading real files under `root`.
    pub fn open(root: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self::with_opener(root, config, FsOpener)
    }
}

impl<O: LogOpener> LogSession<O> {
    pub fn with_opener(root: impl Into<PathBuf>, config: AppConfig, opener: O) -> Self {
        let engine = SearchEngine::with_options(opener, config.search_options());
        Self {
            root: root.into(),
            config,
            engine,
            files: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &SearchEngine<O> {
        &self.engine
    }

    /// Files from the last successful `discover`.
    pub fn files(&self) -> &[LogFile] {
        &self.files
    }

    /// Non-fatal warnings from the last `discover`.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Re-list the log directory, replacing the known file list.
    pub fn discover(&mut self) -> Result<&[LogFile], LaralogError> {
        let (files, warnings) = discover_log_files(&self.root, &self.config.discovery_config())?;

        for w in &warnings {
            tracing::warn!(warning = %w, "Discovery warning");
        }
        tracing::info!(
            root = %self.root.display(),
            files = files.len(),
            "Log files discovered"
        );

        self.files = files;
        self.warnings = warnings;
        Ok(&self.files)
    }

    /// Latest entries across all files, unfiltered and uncached.
    ///
    /// Each file is parsed up to `max_entries`; the combined set is sorted
    /// newest first and truncated. `total` counts everything parsed.
    pub fn load(&mut self) -> Result<LoadedLogs, LaralogError> {
        self.sync_files()?;

        let started = Instant::now();
        let max = self.config.max_entries;
        let mut entries: Vec<LogEntry> = Vec::new();
        let mut files_failed = 0;

        for file in &self.files {
            match parse_file(self.engine.opener(), &file.path, max) {
                Ok(parsed) => entries.extend(parsed),
                Err(e) => match self.engine.failure_policy() {
                    FailurePolicy::Abort => {
                        return Err(SearchError::File {
                            file: file.path.clone(),
                            source: e,
                        }
                        .into());
                    }
                    FailurePolicy::SkipFailing => {
                        tracing::warn!(
                            file = %file.path.display(),
                            error = %e,
                            "Skipping unreadable log file"
                        );
                        files_failed += 1;
                    }
                },
            }
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total = entries.len();
        entries.truncate(max);

        let loaded = LoadedLogs {
            entries,
            total,
            files_loaded: self.files.len() - files_failed,
            files_failed,
            execution_time: started.elapsed(),
        };

        tracing::debug!(
            total,
            returned = loaded.entries.len(),
            elapsed_ms = loaded.execution_time.as_millis() as u64,
            "Logs loaded"
        );
        Ok(loaded)
    }

    /// Run `query` over the discovered files with the configured cap.
    pub fn search(&mut self, query: &SearchQuery) -> Result<SearchResult, LaralogError> {
        self.sync_files()?;
        Ok(self
            .engine
            .search(query, &self.files, self.config.max_entries)?)
    }

    /// Drop cached results and re-list the log directory.
    pub fn refresh(&mut self) -> Result<&[LogFile], LaralogError> {
        self.engine.clear_cache();
        self.discover()
    }

    pub fn locate(&self, entry: &LogEntry) -> FileLocation {
        FileLocation {
            path: entry.file_path.clone(),
            line: entry.line_number,
        }
    }

    /// Map user-supplied file references to discovered paths.
    ///
    /// A reference matches a discovered file by full path or by file name.
    /// Unmatched references are returned verbatim so the query selects
    /// nothing for them rather than silently widening.
    pub fn resolve_file_refs(&self, refs: &[String]) -> Vec<String> {
        refs.iter()
            .map(|r| {
                self.files
                    .iter()
                    .find(|f| {
                        f.path == Path::new(r)
                            || f.path.file_name().and_then(|n| n.to_str()) == Some(r.as_str())
                    })
                    .map(|f| f.path.to_string_lossy().into_owned())
                    .unwrap_or_else(|| r.clone())
            })
            .collect()
    }

    /// Discover on first use, otherwise re-read every known file's metadata
    /// so the cache key reflects modification times at call time.
    ///
    /// A file whose metadata can no longer be read keeps its old record; the
    /// parse then fails and the failure policy decides.
    fn sync_files(&mut self) -> Result<(), LaralogError> {
        if self.files.is_empty() {
            self.discover()?;
            return Ok(());
        }

        for file in &mut self.files {
            match file_metadata(&file.path) {
                Ok(fresh) => *file = fresh,
                Err(e) => tracing::debug!(error = %e, "Keeping stale file record"),
            }
        }
        Ok(())
    }
}
