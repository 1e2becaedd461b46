//! Console and optional file logging.
//!
//! Console output goes to stderr so that a recording can be written to
//! stdout. When a log directory is configured, records are also written to
//! a daily rolling file and files older than the retention period are
//! removed at startup.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "dvbtune.log";

/// Where and how much to log.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogOptions<'a> {
    pub log_dir: Option<&'a Path>,
    pub retention_days: u64,
    pub verbose: bool,
    /// Filter directive from the config file, e.g. `info` or `dvbtune=debug`.
    pub level: Option<&'a str>,
}

fn env_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = match (verbose, level) {
            (true, _) => "debug",
            (false, Some(level)) => level,
            (false, None) => "info",
        };
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initialize the logging system.
pub(crate) fn init_logging(options: &LogOptions<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(LocalTimeTimer);

    let file = match options.log_dir {
        Some(log_dir) => {
            fs::create_dir_all(log_dir)?;
            clean_old_logs(log_dir, options.retention_days)?;

            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            // The guard flushes on drop; keep it for the lifetime of the process.
            let _ = Box::leak(Box::new(guard));

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_timer(LocalTimeTimer),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(options.verbose, options.level))
        .with(console)
        .with(file);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set default subscriber: {}", e))?;

    // Bridge the log:: records of the library to tracing
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to initialize LogTracer: {}", e))?;

    Ok(())
}

/// Remove log files older than `retention_days`.
fn clean_old_logs(log_dir: &Path, retention_days: u64) -> io::Result<()> {
    if !log_dir.exists() {
        return Ok(());
    }

    // A retention beyond what a timestamp can express keeps everything.
    let Some(cutoff) = i64::try_from(retention_days)
        .ok()
        .and_then(chrono::TimeDelta::try_days)
        .and_then(|age| Local::now().checked_sub_signed(age))
    else {
        return Ok(());
    };

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.contains(LOG_FILE_NAME));
        if !is_log {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => chrono::DateTime::<Local>::from(modified),
            Err(_) => continue,
        };
        if modified < cutoff {
            if let Err(e) = fs::remove_file(&path) {
                eprintln!("Failed to remove old log file {:?}: {}", path, e);
            }
        }
    }

    Ok(())
}

/// Custom timer for local time formatting in logs
#[derive(Debug, Clone, Copy)]
struct LocalTimeTimer;

impl fmt::time::FormatTime for LocalTimeTimer {
    fn format_time(&self, w: &mut fmt::format::Writer) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.6f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_old_logs_keeps_other_files() {
        let dir = std::env::temp_dir().join(format!("dvbtune-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let log = dir.join(format!("{}.2020-01-01", LOG_FILE_NAME));
        let other = dir.join("notes.txt");
        fs::write(&log, b"old").unwrap();
        fs::write(&other, b"keep").unwrap();

        // Nothing is older than the cutoff yet with a long retention.
        clean_old_logs(&dir, 30).unwrap();
        assert!(log.exists());

        // Retentions too long to subtract from now keep everything.
        clean_old_logs(&dir, u64::MAX).unwrap();
        clean_old_logs(&dir, i64::MAX as u64).unwrap();
        clean_old_logs(&dir, 1 << 40).unwrap();
        assert!(log.exists());

        // Zero retention only ever touches log files.
        clean_old_logs(&dir, 0).unwrap();
        assert!(other.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dir_is_ignored() {
        let dir = std::env::temp_dir().join("dvbtune-no-such-log-dir");
        assert!(clean_old_logs(&dir, 7).is_ok());
    }
}
