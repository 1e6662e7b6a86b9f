pub mod discover;

use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use flock_common::config::{Config, DEFAULT_WINDOW};

#[derive(Parser)]
#[command(name = "flock")]
#[command(about = "Find devices announcing themselves over mDNS.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Print more diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print less (-q drops headers, -qq drops the device tree)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover devices on the local network
    #[command(alias = "d")]
    Discover(DiscoverArgs),
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Service type to browse, e.g. "_ipp._tcp.local." (default: every advertised type)
    #[arg(short, long)]
    pub service: Option<String>,

    /// How long to collect announcements, in milliseconds
    #[arg(short, long, value_name = "MS", value_parser = parse_millis)]
    pub window: Option<Duration>,

    /// Timeout handed to the backend when collecting results, in milliseconds
    /// (default: the window)
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub collect_timeout: Option<Duration>,

    /// Give up on backend calls that take longer than this, in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub call_timeout: Option<Duration>,

    /// Use built-in sample devices instead of the network
    #[arg(long)]
    pub simulate: bool,
}

impl DiscoverArgs {
    pub fn to_config(&self, quiet: u8, no_banner: bool) -> Config {
        let window = self.window.unwrap_or(DEFAULT_WINDOW);
        Config {
            service_type: self.service.clone(),
            window,
            collect_timeout: self.collect_timeout.unwrap_or(window),
            call_timeout: self.call_timeout,
            quiet,
            no_banner,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_millis(s: &str) -> Result<Duration, String> {
    s.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| format!("invalid milliseconds '{s}': {e}"))
}
