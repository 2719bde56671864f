// laralog - core/parser.rs
//
// Stream-oriented log file parsing.
// Core layer: reads through the `LogOpener` seam and `BufRead`, never touches
// the filesystem directly.
//
// A file is consumed one physical line at a time. `LineState` holds the entry
// under construction and any pending stack-trace lines; `EntryStream` drives it
// from a reader and enforces the entry cap.

use crate::core::model::{LogEntry, LogLevel};
use crate::core::stack_trace::parse_stack_trace;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared flag a caller raises to stop a parse or search early.
pub type CancelFlag = Arc<AtomicBool>;

/// Opens log files for line-by-line reading.
///
/// The real implementation lives in `platform::fs`; tests substitute readers
/// over in-memory text.
pub trait LogOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>>;
}

// =============================================================================
// Header recognition
// =============================================================================

/// `[yyyy-MM-dd HH:mm:ss] <env>.<LEVEL>: <message>`, env optional.
/// Digits and env/level tokens are ASCII only.
fn header_pattern() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^\[([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\](?:\s+([A-Za-z0-9_]+))?\.([A-Za-z0-9_]+):\s+(.+)$")
            .expect("header_pattern: invalid regex")
    })
}

/// Fields captured from a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub level: LogLevel,
    pub message: String,
}

/// Recognise a header line.
///
/// Lines whose timestamp is not a real calendar date-time or whose level token
/// is unknown are not headers; the parser folds them into the current message.
pub fn parse_header(line: &str) -> Option<Header> {
    let caps = header_pattern().captures(line)?;

    let timestamp = NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%d %H:%M:%S")
        .ok()?
        .and_utc();
    let level = LogLevel::from_token(&caps[3])?;
    let environment = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| constants::DEFAULT_ENVIRONMENT.to_string());

    Some(Header {
        timestamp,
        environment,
        level,
        message: caps[4].trim().to_string(),
    })
}

// =============================================================================
// Line state machine
// =============================================================================

/// Parser state threaded through a file one line at a time.
///
/// Feeding lines and collecting every returned entry, then calling `finish`,
/// yields the file's entries in order. No I/O happens here.
#[derive(Debug)]
pub struct LineState {
    file_path: PathBuf,
    line_number: u64,
    current: Option<LogEntry>,
    trace_lines: Vec<String>,
    collecting_stack_trace: bool,
}

impl LineState {
    pub fn new(file_path: &Path) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            line_number: 0,
            current: None,
            trace_lines: Vec::new(),
            collecting_stack_trace: false,
        }
    }

    /// Number of physical lines fed so far.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Consume one physical line (without its terminator).
    ///
    /// Returns the previous entry, completed, when `line` starts a new one.
    pub fn feed(&mut self, line: &str) -> Option<LogEntry> {
        self.line_number += 1;

        if let Some(header) = parse_header(line) {
            let completed = self.take_current();
            self.current = Some(LogEntry {
                id: LogEntry::make_id(&self.file_path, self.line_number),
                timestamp: header.timestamp,
                environment: header.environment,
                level: header.level,
                message: header.message,
                stack_trace: Vec::new(),
                file_path: self.file_path.clone(),
                line_number: self.line_number,
            });
            self.collecting_stack_trace = false;
            return completed;
        }

        // Anything before the first header is noise.
        let Some(entry) = self.current.as_mut() else {
            return None;
        };

        let trimmed = line.trim();
        if trimmed.to_lowercase().contains(constants::STACK_TRACE_MARKER) {
            self.collecting_stack_trace = true;
        } else if self.collecting_stack_trace {
            if trimmed.starts_with('#') {
                self.trace_lines.push(line.to_string());
            }
        } else if !trimmed.is_empty() {
            entry.message.push('\n');
            entry.message.push_str(trimmed);
        }
        None
    }

    /// Flush the entry still under construction at end of input.
    pub fn finish(&mut self) -> Option<LogEntry> {
        self.collecting_stack_trace = false;
        self.take_current()
    }

    fn take_current(&mut self) -> Option<LogEntry> {
        let mut entry = self.current.take()?;
        if !self.trace_lines.is_empty() {
            entry.stack_trace = parse_stack_trace(&self.trace_lines);
            self.trace_lines.clear();
        }
        Some(entry)
    }
}

// =============================================================================
// Streaming iterator
// =============================================================================

/// Lazy sequence of entries read from one log file.
///
/// Finite and not restartable. Stops as soon as `max_entries` entries have
/// been yielded; when input ends before that, the last pending entry is always
/// flushed. An I/O error or cancellation is yielded once and ends the stream.
pub struct EntryStream<R> {
    reader: R,
    state: LineState,
    buf: Vec<u8>,
    max_entries: usize,
    produced: usize,
    done: bool,
    cancel: Option<CancelFlag>,
}

impl<R: BufRead> EntryStream<R> {
    pub fn new(reader: R, file_path: &Path, max_entries: usize) -> Self {
        Self {
            reader,
            state: LineState::new(file_path),
            buf: Vec::new(),
            max_entries,
            produced: 0,
            done: false,
            cancel: None,
        }
    }

    /// Check `cancel` before every line read.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Entries yielded so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Physical lines read so far.
    pub fn lines_read(&self) -> u64 {
        self.state.line_number()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn complete(&mut self) {
        self.done = true;
        tracing::debug!(
            file = %self.state.file_path.display(),
            entries = self.produced,
            lines = self.state.line_number(),
            "Parsing complete"
        );
    }
}

impl<R: BufRead> Iterator for EntryStream<R> {
    type Item = Result<LogEntry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.produced >= self.max_entries {
            self.complete();
            return None;
        }

        loop {
            if self.is_cancelled() {
                self.done = true;
                tracing::debug!(
                    file = %self.state.file_path.display(),
                    entries = self.produced,
                    "Parsing cancelled"
                );
                return Some(Err(ParseError::Cancelled {
                    file: self.state.file_path.clone(),
                }));
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    let last = self.state.finish();
                    if last.is_some() {
                        self.produced += 1;
                    }
                    self.complete();
                    return last.map(Ok);
                }
                Ok(_) => {
                    let line = decode_line(&self.buf);
                    if let Some(entry) = self.state.feed(&line) {
                        self.produced += 1;
                        if self.produced >= self.max_entries {
                            self.complete();
                        }
                        return Some(Ok(entry));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ParseError::Io {
                        file: self.state.file_path.clone(),
                        source: e,
                    }));
                }
            }
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily so one bad
/// byte sequence cannot fail the whole file.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end])
}

// =============================================================================
// Entry points
// =============================================================================

/// Open `path` and return a lazy stream of at most `max_entries` entries.
pub fn parse_stream<O: LogOpener + ?Sized>(
    opener: &O,
    path: &Path,
    max_entries: usize,
) -> Result<EntryStream<Box<dyn BufRead + Send>>, ParseError> {
    tracing::debug!(file = %path.display(), max_entries, "Parsing started");
    let reader = opener.open(path).map_err(|e| ParseError::Io {
        file: path.to_path_buf(),
        source: e,
    })?;
    Ok(EntryStream::new(reader, path, max_entries))
}

/// Parse `path` fully into a vector, same cap as `parse_stream`.
pub fn parse_file<O: LogOpener + ?Sized>(
    opener: &O,
    path: &Path,
    max_entries: usize,
) -> Result<Vec<LogEntry>, ParseError> {
    parse_stream(opener, path, max_entries)?.collect()
}
