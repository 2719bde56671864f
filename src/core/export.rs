// laralog - core/export.rs
//
// CSV and JSON export of search results.
// Writes to any Write trait object; `export_to_file` is the only entry point
// that creates a file.

use crate::core::model::LogEntry;
use crate::core::query::SearchResult;
use crate::util::error::ExportError;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format, chosen from the export path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.csv` exports CSV; anything else exports JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Export entries to CSV.
///
/// Writes: timestamp, environment, level, file, line, message, frames
pub fn export_csv<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_error = |source| ExportError::Csv {
        path: export_path.to_path_buf(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "timestamp",
            "environment",
            "level",
            "file",
            "line",
            "message",
            "frames",
        ])
        .map_err(csv_error)?;

    for entry in entries {
        csv_writer
            .write_record([
                entry.timestamp.to_rfc3339().as_str(),
                entry.environment.as_str(),
                entry.level.as_str(),
                entry.file_path.display().to_string().as_str(),
                entry.line_number.to_string().as_str(),
                entry.message.as_str(),
                entry.stack_trace.len().to_string().as_str(),
            ])
            .map_err(csv_error)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(entries.len())
}

/// Export the whole result, including totals and timing, as pretty JSON.
pub fn export_json<W: Write>(
    result: &SearchResult,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, result).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(result.entries.len())
}

/// Create `path` and export `result` in the format its extension selects.
/// Returns the number of entries written.
pub fn export_to_file(result: &SearchResult, path: &Path) -> Result<usize, ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    let count = match ExportFormat::from_path(path) {
        ExportFormat::Csv => export_csv(&result.entries, &mut writer, path)?,
        ExportFormat::Json => export_json(result, &mut writer, path)?,
    };
    writer.flush().map_err(io_error)?;

    tracing::info!(path = %path.display(), entries = count, "Export complete");
    Ok(count)
}
