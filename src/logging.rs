//! tracing-subscriber setup for the binary.
//!
//! In host mode stdout carries frames, so diagnostics go to a file in the
//! store directory. Every other command logs to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where diagnostics are written.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

fn filter(debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "info" };
    EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Failing to open the log file disables
/// logging rather than falling back to stdout.
pub fn init(target: LogTarget<'_>, debug: bool) {
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter(debug))
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
                return;
            };
            let _ = tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter(debug))
                .try_init();
        }
    }
}
