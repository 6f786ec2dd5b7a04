use std::path::PathBuf;

use checkpointz_dashboard::config::ConfigOverrides;
use checkpointz_types::primitives::Slot;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Checkpointz instance
    #[arg(long, global = true, env = "CHECKPOINTZ_ENDPOINT")]
    pub endpoint: Option<String>,

    /// YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds between polls of the status and slots endpoints
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbosity level
    #[arg(short, long, global = true, default_value_t = 3)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            poll_interval_secs: self.poll_interval,
            no_color: self.no_color,
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "off",
            1 => "error",
            2 => "warn",
            3 => "info",
            4 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the network, operating mode and the checkpoints being served
    #[command(name = "status")]
    Status,

    /// List the upstream beacon nodes
    #[command(name = "upstreams")]
    Upstreams(SearchCommand),

    /// List the historical checkpoints
    #[command(name = "checkpoints")]
    Checkpoints(SearchCommand),

    /// Show one historical slot
    #[command(name = "slot")]
    Slot(SlotCommand),

    /// Keep the full dashboard on screen, refreshing as data changes
    #[command(name = "watch")]
    Watch(WatchCommand),

    /// Walk through checkpoint syncing a consensus client from this instance
    #[command(name = "get-started")]
    GetStarted(GetStartedCommand),
}

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Only show rows containing this text
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Debug, Args)]
pub struct SlotCommand {
    pub slot: Slot,

    /// Show graffiti as raw hex instead of text
    #[arg(long)]
    pub hex: bool,
}

#[derive(Debug, Args)]
pub struct WatchCommand {
    #[arg(long, default_value = "")]
    pub upstream_search: String,

    #[arg(long, default_value = "")]
    pub slot_search: String,
}

#[derive(Debug, Args)]
pub struct GetStartedCommand {
    /// Consensus client to show the guide for
    #[arg(long)]
    pub client: Option<String>,
}
