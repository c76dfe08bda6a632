//! Configuration types for FeedbackFlow.
//!
//! [`Config::load`] reads `~/.config/feedbackflow/config.toml`, creating it
//! with hardcoded defaults if it does not yet exist, then applies
//! `FEEDBACKFLOW__SECTION__KEY` environment overrides. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in
//! tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[store]
dir       = "~/.feedbackflow"
log_file  = "feedback.log"
meta_file = "feedback_meta.json"

[host]
base_dir           = "~"
max_frame_bytes    = 67108864
max_response_bytes = 1048576

[tail]
poll_interval_ms = 500

[server]
host = "127.0.0.1"
port = 8080
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub tail: TailConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[store]` section: where the log and metadata files live.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_meta_file")]
    pub meta_file: String,
}

fn default_store_dir() -> String { "~/.feedbackflow".to_string() }
fn default_log_file() -> String { "feedback.log".to_string() }
fn default_meta_file() -> String { "feedback_meta.json".to_string() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            log_file: default_log_file(),
            meta_file: default_meta_file(),
        }
    }
}

impl StoreConfig {
    /// Store directory with a leading `~` expanded.
    pub fn dir_path(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

/// `[host]` section: native messaging limits and path resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Directory that `writeFeedback` / `clearFeedback` paths are joined to.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    /// Largest inbound frame accepted before the session is dropped.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: u32,
    /// Largest outbound frame; browsers reject bigger host messages.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u32,
}

fn default_base_dir() -> String { "~".to_string() }
fn default_max_frame_bytes() -> u32 { 64 * 1024 * 1024 }
fn default_max_response_bytes() -> u32 { 1024 * 1024 }

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            max_frame_bytes: default_max_frame_bytes(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl HostConfig {
    pub fn base_dir_path(&self) -> PathBuf {
        expand_home(&self.base_dir)
    }
}

/// `[tail]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TailConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 { 500 }

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TailConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

/// `[server]` section for the assistant-protocol HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String { "127.0.0.1".to_string() }
fn default_server_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/feedbackflow/config.toml`, layered on top of the
    /// built-in defaults and under environment overrides. Creates the file
    /// with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Same as [`Config::load`] with an explicit file location.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("FEEDBACKFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Defaults with the store pointed at `dir` and raw host paths resolved
    /// against it as well.
    pub fn isolated(dir: &Path) -> Self {
        let mut cfg = Self::defaults();
        cfg.store.dir = dir.display().to_string();
        cfg.host.base_dir = dir.display().to_string();
        cfg
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        home_dir()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(raw)
    }
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("feedbackflow")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
