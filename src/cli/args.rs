//! CLI argument definitions using clap
//!
//! Commands:
//! - itemstore init --config <path>
//! - itemstore serve --config <path> [--port <port>]
//! - itemstore dump --config <path>
//! - itemstore compact --config <path>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// itemstore - A small, durable, self-hostable item store
#[derive(Parser, Debug)]
#[command(name = "itemstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new itemstore data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,
    },

    /// Open the store and serve the HTTP API until Ctrl-C
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,

        /// Port to bind, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print every stored item as JSON and exit
    Dump {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,
    },

    /// Rewrite the record file keeping only live items
    Compact {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,
    },
}

impl Command {
    /// Configuration file the command runs against
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Init { config }
            | Command::Serve { config, .. }
            | Command::Dump { config }
            | Command::Compact { config } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
