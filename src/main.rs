use std::path::PathBuf;

use clap::{Parser, Subcommand};
use feedbackflow::commands;
use feedbackflow::core::config::Config;
use feedbackflow::core::{EntryKey, Store};
use feedbackflow::logging::{self, LogTarget};

#[derive(Parser)]
#[command(name = "feedbackflow", about = "FeedbackFlow: browser feedback host and store")]
struct Cli {
    /// Verbose logging (`RUST_LOG` still wins when set).
    #[arg(long, global = true)]
    debug: bool,

    /// Use this store directory instead of the configured one.
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Read configuration from this file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the native messaging channel on stdin/stdout.
    Host,
    /// Serve the assistant resources and tools over HTTP.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the feedback log.
    Read {
        /// Keep printing new feedback until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },
    /// Clear the log and metadata.
    Clear,
    /// Append a feedback entry.
    Add {
        message: String,
        #[arg(long)]
        source: Option<String>,
        /// JSON object stored alongside the entry.
        #[arg(long)]
        context: Option<String>,
    },
    /// Mark an entry as addressed by timestamp or id.
    Mark {
        #[arg(required_unless_present = "id")]
        timestamp: Option<String>,
        #[arg(long, conflicts_with = "timestamp")]
        id: Option<u64>,
        #[arg(long)]
        resolution: Option<String>,
    },
    /// Print the log file status as JSON.
    Status,
    /// Print the metadata document as JSON.
    Meta,
}

fn load_config(cli_config: Option<&PathBuf>) -> (Config, Option<anyhow::Error>) {
    let loaded = match cli_config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::defaults(), Some(e)),
    }
}

async fn ctrl_c() {
    let _ = tokio::signal::ctrl_c().await;
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = if commands::launched_by_browser(&args) {
        Cli {
            debug: false,
            store_dir: None,
            config: None,
            command: Command::Host,
        }
    } else {
        Cli::parse_from(&args)
    };

    let (mut cfg, config_err) = load_config(cli.config.as_ref());
    if let Some(dir) = &cli.store_dir {
        cfg.store.dir = dir.display().to_string();
    }
    let store = Store::from_config(&cfg.store);

    let host_log = store.dir().join("host.log");
    let target = match cli.command {
        Command::Host => LogTarget::File(&host_log),
        _ => LogTarget::Stderr,
    };
    logging::init(target, cli.debug);
    if let Some(e) = config_err {
        tracing::warn!(error = %e, "config unreadable; using defaults");
    }

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Host => {
            drop(stdout);
            commands::host(&cfg)?;
        }
        Command::Serve { port, bind } => {
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(bind) = bind {
                cfg.server.host = bind;
            }
            tokio::runtime::Runtime::new()?.block_on(commands::serve(&cfg, ctrl_c()))?;
        }
        Command::Read { watch: false } => commands::read(&store, &mut stdout)?,
        Command::Read { watch: true } => {
            let interval = cfg.tail.poll_interval();
            tokio::runtime::Runtime::new()?
                .block_on(commands::watch(&store, interval, &mut stdout, ctrl_c()))?;
        }
        Command::Clear => commands::clear(&store, &mut stdout)?,
        Command::Add {
            message,
            source,
            context,
        } => commands::add(&store, &message, source, context.as_deref(), &mut stdout)?,
        Command::Mark {
            timestamp,
            id,
            resolution,
        } => {
            let key = match (id, timestamp) {
                (Some(id), _) => EntryKey::Id(id),
                (None, Some(ts)) => EntryKey::Timestamp(ts),
                (None, None) => anyhow::bail!("give a timestamp or --id"),
            };
            commands::mark(&store, key, resolution, &mut stdout)?;
        }
        Command::Status => commands::status(&store, &mut stdout)?,
        Command::Meta => commands::meta(&store, &mut stdout)?,
    }

    Ok(())
}
