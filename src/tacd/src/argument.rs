use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "tacd", about = "Traffic-Aware Controller Daemon")]
pub struct Opts {
    /// Traffic monitoring interval in seconds
    #[structopt(short = "i", long = "interval", default_value = "5")]
    pub interval_secs: u64,

    /// Number of discovered directed links that arms the one-shot
    /// proactive installation
    #[structopt(long, default_value = "10")]
    pub proactive_threshold: usize,

    /// Settle delay in seconds between the trigger and the proactive
    /// installation, to let the remaining links be discovered
    #[structopt(long, default_value = "3")]
    pub settle_delay_secs: u64,

    /// Nominal capacity in Mbps assumed for discovered links
    #[structopt(long, default_value = "100")]
    pub capacity_mbps: u64,

    /// TOML registry of known hosts for the proactive installation
    #[structopt(long, parse(from_os_str))]
    pub hosts: Option<PathBuf>,
}
