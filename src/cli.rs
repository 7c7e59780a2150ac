use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (defaults to the first of ./cfctl.toml,
    /// ~/.config/cfctl/config.toml, /etc/cfctl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level [default: the `[logging]` level from the config]
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set log format, text or json [default: the `[logging]` format from the config]
    #[arg(long)]
    pub log_format: Option<String>,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Don't prompt for input, use defaults
        #[arg(long)]
        no_prompt: bool,

        /// Force overwrite if config file exists
        #[arg(long)]
        force: bool,
    },

    /// List zone names in the account
    Zones {
        /// Only show the zone with this domain name
        #[arg(long)]
        name: Option<String>,
    },

    /// List DNS records of a zone
    Records {
        /// Zone ID
        #[arg(long)]
        zone: String,
    },

    /// Turn the proxy on (or off) for a DNS record
    Proxy {
        /// Zone ID
        #[arg(long)]
        zone: String,

        /// Record ID
        #[arg(long)]
        record: String,

        /// Send traffic straight to the origin instead
        #[arg(long)]
        off: bool,
    },
}
