//! Command implementations behind the CLI verbs.
//!
//! Each one writes its human-facing output to the supplied writer so the
//! integration harnesses can run them without a terminal.

use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;

use anyhow::{bail, Context};
use ff_core::config::Config;
use ff_core::{EntryKey, MarkOutcome, Store, Tailer};
use ff_host::{HostLimits, ServeSummary};
use serde_json::{Map, Value};
use tracing::info;

/// Browsers launch the host with the caller's origin (Chrome) or the
/// manifest path and extension id (Firefox) instead of a subcommand.
pub fn launched_by_browser(args: &[String]) -> bool {
    args.get(1).is_some_and(|first| {
        first.starts_with("chrome-extension://")
            || first.starts_with("moz-extension://")
            || first.ends_with(".json")
    })
}

/// Serve the framed channel on stdin/stdout until the browser closes it.
pub fn host(cfg: &Config) -> anyhow::Result<ServeSummary> {
    let handler = ff_host::Handler::from_config(cfg);
    info!(store = %handler.store().dir().display(), "native host started");
    ff_host::serve_stdio(&handler, HostLimits::from(&cfg.host)).context("native messaging channel failed")
}

/// Run the assistant-protocol HTTP surface until `shutdown` resolves.
pub async fn serve<S>(cfg: &Config, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.server.host, cfg.server.port))?;
    ff_mcp::serve(addr, Store::from_config(&cfg.store), shutdown)
        .await
        .with_context(|| format!("serving on {addr}"))
}

/// Print the whole log.
pub fn read<W: Write>(store: &Store, out: &mut W) -> anyhow::Result<()> {
    match store.read_log_opt()? {
        Some(log) => write!(out, "{log}")?,
        None => {
            writeln!(out, "Feedback log file not found at: {}", store.log_path().display())?;
            writeln!(out, "Make sure the extension is installed and has been used.")?;
        }
    }
    Ok(())
}

/// Print log growth until `shutdown` resolves.
pub async fn watch<W, S>(
    store: &Store,
    interval: std::time::Duration,
    out: &mut W,
    shutdown: S,
) -> anyhow::Result<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let mut tailer = Tailer::new(store.log_path())?;
    writeln!(out, "Watching feedback log file at: {}", store.log_path().display())?;
    out.flush()?;

    let mut write_err = None;
    tailer
        .follow(
            interval,
            |text| {
                if write_err.is_none() {
                    if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
                        write_err = Some(e);
                    }
                }
            },
            shutdown,
        )
        .await;

    match write_err {
        Some(e) => Err(e).context("writing watched feedback"),
        None => Ok(()),
    }
}

pub fn clear<W: Write>(store: &Store, out: &mut W) -> anyhow::Result<()> {
    let ts = store.clear()?;
    writeln!(out, "Feedback log cleared successfully at {ts}")?;
    Ok(())
}

/// Parse `--context` as a JSON object.
pub fn parse_context(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("--context is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--context must be a JSON object, got {other}"),
    }
}

pub fn add<W: Write>(
    store: &Store,
    message: &str,
    source: Option<String>,
    context: Option<&str>,
    out: &mut W,
) -> anyhow::Result<()> {
    let context = context.map(parse_context).transpose()?;
    let entry = store.append(message, source, context)?;
    writeln!(
        out,
        "Feedback added successfully at {} (id {})",
        entry.timestamp, entry.id
    )?;
    Ok(())
}

/// Mark an entry; an unknown key is an error so the process exits non-zero.
pub fn mark<W: Write>(
    store: &Store,
    key: EntryKey,
    resolution: Option<String>,
    out: &mut W,
) -> anyhow::Result<()> {
    match store.mark_addressed(&key, resolution)? {
        MarkOutcome::Found => {
            writeln!(out, "Feedback entry marked as addressed")?;
            Ok(())
        }
        MarkOutcome::NotFound => bail!("No feedback entry found with {key}"),
    }
}

pub fn status<W: Write>(store: &Store, out: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &store.status()?)?;
    writeln!(out)?;
    Ok(())
}

pub fn meta<W: Write>(store: &Store, out: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &store.read_meta()?)?;
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn browser_launch_is_detected() {
        assert!(launched_by_browser(&args(&["ff", "chrome-extension://abcdef/"])));
        assert!(launched_by_browser(&args(&[
            "ff",
            "/home/u/.mozilla/native-messaging-hosts/com.feedbackflow.host.json",
            "feedbackflow@example.org",
        ])));
        assert!(!launched_by_browser(&args(&["ff", "status"])));
        assert!(!launched_by_browser(&args(&["ff"])));
    }

    #[test]
    fn context_must_be_an_object() {
        assert_eq!(parse_context(r#"{"line": 3}"#).unwrap()["line"], 3);
        assert!(parse_context("[1, 2]").is_err());
        assert!(parse_context("{oops").is_err());
    }

    #[test]
    fn read_reports_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        let mut out = Vec::new();
        read(&store, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Feedback log file not found at:"));
    }

    #[test]
    fn mark_unknown_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        let err = mark(&store, EntryKey::Id(9), None, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No feedback entry found with id 9");
    }
}
