//! Tracing setup. The TUI owns stdout, so interactive sessions log to a file;
//! one-shot commands log to stderr.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{DialerError, Result};

const LOG_FILE_PREFIX: &str = "ridge-dialer.log";

pub enum LogTarget {
    /// Daily-rolling file in `dir`, or exactly `file` when one is configured
    File { dir: PathBuf, file: Option<PathBuf> },
    Stderr,
}

/// Build the filter directive for a level name. Our own crate logs at `level`,
/// dependencies only at warn and above. Unknown levels fall back to info.
pub fn filter_directive(level: &str) -> String {
    let level = match level.to_ascii_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
        _ => "info".to_string(),
    };
    format!("warn,ridge_dialer={}", level)
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// The returned guard flushes the file writer when dropped and must be held for the
/// life of the process.
pub fn init(level: &str, target: LogTarget) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    match target {
        LogTarget::File { dir, file } => {
            let appender = match file {
                Some(file) => {
                    let name = file
                        .file_name()
                        .map(|n| n.to_os_string())
                        .unwrap_or_else(|| LOG_FILE_PREFIX.into());
                    let dir = file.parent().map(Path::to_path_buf).unwrap_or(dir);
                    std::fs::create_dir_all(&dir)?;
                    tracing_appender::rolling::never(dir, name)
                }
                None => {
                    std::fs::create_dir_all(&dir)?;
                    tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX)
                }
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| DialerError::Config(format!("Failed to init logging: {}", e)))?;
            Ok(Some(guard))
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .try_init()
                .map_err(|e| DialerError::Config(format!("Failed to init logging: {}", e)))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "warn,ridge_dialer=debug");
        assert_eq!(filter_directive("WARN"), "warn,ridge_dialer=warn");
        assert_eq!(filter_directive("loud"), "warn,ridge_dialer=info");
    }

    #[test]
    fn test_directive_parses() {
        for level in ["trace", "debug", "info", "warn", "error", "off"] {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok());
        }
    }
}
