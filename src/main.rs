// laralog - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (platform config dir or --config)
// 3. Logging initialisation (debug mode support)
// 4. Discovery, search, and output (text, JSON, or export file)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::Parser;
use laralog::app::session::LogSession;
use laralog::core::export::export_to_file;
use laralog::core::model::{LogEntry, LogLevel};
use laralog::core::query::{SearchQuery, SearchResult};
use laralog::platform::config::{self, AppConfig, PlatformPaths};
use laralog::util::{self, constants, error::LaralogError};
use std::path::PathBuf;

/// laralog - search Laravel-style application logs
#[derive(Parser, Debug)]
#[command(name = "laralog", version, about)]
struct Cli {
    /// Project root containing the log directory.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Case-insensitive keyword matched against message and environment.
    #[arg(short = 'k', long = "keyword")]
    keyword: Option<String>,

    /// Only show entries at these levels (repeatable).
    #[arg(short = 'l', long = "level")]
    levels: Vec<LogLevel>,

    /// Only show entries from these environments (repeatable).
    #[arg(short = 'e', long = "env")]
    environments: Vec<String>,

    /// Earliest timestamp, "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS" or RFC 3339.
    #[arg(long = "since", value_parser = parse_since)]
    since: Option<DateTime<Utc>>,

    /// Latest timestamp, same formats as --since. A bare date includes the
    /// whole day.
    #[arg(long = "until", value_parser = parse_until)]
    until: Option<DateTime<Utc>>,

    /// Maximum entries to return (overrides config).
    #[arg(short = 'n', long = "max", value_parser = parse_max_entries)]
    max_entries: Option<usize>,

    /// Restrict the search to these files, by name or path (repeatable).
    #[arg(long = "file")]
    files: Vec<String>,

    /// Print the result as JSON.
    #[arg(long = "json")]
    json: bool,

    /// Write the result to a .csv or .json file.
    #[arg(long = "export")]
    export: Option<PathBuf>,

    /// Use this config file instead of the platform default.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_since(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s, (0, 0, 0))
}

fn parse_until(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s, (23, 59, 59))
}

/// `date_time` is the time of day used when `s` is a bare date.
fn parse_timestamp(s: &str, date_time: (u32, u32, u32)) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let (h, m, sec) = date_time;
        if let Some(naive) = date.and_hms_opt(h, m, sec) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!(
        "invalid timestamp '{s}' (expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339)"
    ))
}

/// Same bounds as `[search] max_entries` in config.toml.
fn parse_max_entries(s: &str) -> Result<usize, String> {
    let max: usize = s
        .parse()
        .map_err(|_| format!("invalid number '{s}'"))?;
    if (constants::MIN_MAX_ENTRIES..=constants::ABSOLUTE_MAX_ENTRIES).contains(&max) {
        Ok(max)
    } else {
        Err(format!(
            "{max} is out of range (expected {}-{})",
            constants::MIN_MAX_ENTRIES,
            constants::ABSOLUTE_MAX_ENTRIES
        ))
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so the config level can take effect;
    // its warnings are replayed once the subscriber is installed.
    let (mut app_config, config_warnings) = match load_app_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None);
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "laralog starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
        eprintln!("Warning: {warning}");
    }

    if let Some(max) = cli.max_entries {
        app_config.max_entries = max;
    }

    if let Err(e) = run(&cli, app_config) {
        tracing::error!(error = %e, "laralog failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_app_config(cli: &Cli) -> Result<(AppConfig, Vec<String>), LaralogError> {
    match &cli.config {
        Some(path) => Ok(config::load_config_from(path)?),
        None => Ok(config::load_config(&PlatformPaths::resolve().config_dir)),
    }
}

fn run(cli: &Cli, app_config: AppConfig) -> Result<(), LaralogError> {
    let mut session = LogSession::open(&cli.root, app_config);
    session.discover()?;
    for warning in session.warnings() {
        eprintln!("Warning: {warning}");
    }

    let query = build_query(cli, &session);
    let result = session.search(&query)?;

    if let Some(path) = &cli.export {
        let count = export_to_file(&result, path)?;
        eprintln!("Exported {count} entries to {}", path.display());
    }

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise result");
                eprintln!("Error: failed to serialise result: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_result(&session, &result);
    }
    Ok(())
}

fn build_query(cli: &Cli, session: &LogSession) -> SearchQuery {
    let mut query = SearchQuery::new();
    if let Some(keyword) = &cli.keyword {
        query = query.with_keyword(keyword.clone());
    }
    if !cli.levels.is_empty() {
        query = query.with_levels(cli.levels.iter().copied());
    }
    if !cli.environments.is_empty() {
        query = query.with_environments(cli.environments.iter().cloned());
    }
    if cli.since.is_some() || cli.until.is_some() {
        query = query.with_date_range(
            cli.since.unwrap_or(DateTime::<Utc>::MIN_UTC),
            cli.until.unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
    }
    if !cli.files.is_empty() {
        query = query.with_files(session.resolve_file_refs(&cli.files));
    }
    query
}

fn print_result(session: &LogSession, result: &SearchResult) {
    println!(
        "{} of {} matching entries from {} file(s) in {} ms",
        result.entries.len(),
        result.total,
        result.files_searched,
        result.execution_time.as_millis()
    );
    if result.files_failed > 0 {
        println!("{} file(s) could not be read", result.files_failed);
    }

    for entry in &result.entries {
        print_entry(session, entry);
    }
}

fn print_entry(session: &LogSession, entry: &LogEntry) {
    let location = session.locate(entry);
    println!();
    println!(
        "[{}] {}.{} ({}:{})",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.environment,
        entry.level,
        location.path.display(),
        location.line
    );
    for line in entry.message.lines() {
        println!("    {line}");
    }
    for (i, frame) in entry.stack_trace.iter().enumerate() {
        println!("    #{i} {}({}): {}", frame.file, frame.line, frame.method);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 22).unwrap();
        assert_eq!(parse_since("2024-01-15 14:30:22").unwrap(), expected);
        assert_eq!(parse_until("2024-01-15 14:30:22").unwrap(), expected);
        assert_eq!(parse_since("2024-01-15T14:30:22Z").unwrap(), expected);
        assert_eq!(parse_since("2024-01-15T16:30:22+02:00").unwrap(), expected);
        assert!(parse_since("yesterday").is_err());
    }

    #[test]
    fn test_bare_date_covers_whole_day() {
        assert_eq!(
            parse_since("2024-01-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_until("2024-01-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_max_entries_uses_config_bounds() {
        assert!(Cli::try_parse_from(["laralog", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["laralog", "-n", "100001"]).is_err());
        assert!(Cli::try_parse_from(["laralog", "-n", "many"]).is_err());
        let cli = Cli::parse_from(["laralog", "-n", "100000"]);
        assert_eq!(cli.max_entries, Some(constants::ABSOLUTE_MAX_ENTRIES));
    }

    #[test]
    fn test_cli_parses_repeated_filters() {
        let cli = Cli::parse_from([
            "laralog", "/srv/app", "-l", "error", "-l", "CRITICAL", "-e", "production", "-n",
            "5",
        ]);
        assert_eq!(cli.root, PathBuf::from("/srv/app"));
        assert_eq!(cli.levels, [LogLevel::Error, LogLevel::Critical]);
        assert_eq!(cli.environments, ["production"]);
        assert_eq!(cli.max_entries, Some(5));
    }

    #[test]
    fn test_cli_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["laralog", "-l", "loud"]).is_err());
    }
}
