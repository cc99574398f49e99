//! Logging initialization.
//!
//! In TUI mode logs go to a file so they cannot corrupt the terminal
//! display; in non-interactive report mode they go to stderr. Filtering
//! follows `RUST_LOG` with an `info` default.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// File-backed logging for TUI mode.
///
/// Falls back to no logging rather than writing into the alternate
/// screen when the log file cannot be created.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: could not create log directory: {e}");
            return;
        }
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Stderr logging for non-interactive report mode.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// `~/.local/state/orderlens/orderlens.log` on Linux, the platform
/// equivalent elsewhere, the temp directory as a last resort.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("orderlens").join("orderlens.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("orderlens").join("orderlens.log");
    }

    std::env::temp_dir().join("orderlens.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        assert!(get_log_path().is_absolute());
    }

    #[test]
    fn test_log_path_file_name() {
        assert!(get_log_path().ends_with("orderlens.log"));
    }
}
