//! Command line for the shopkeep-server binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::utils::config::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shopkeep - tool-calling chat server for retail analytics
#[derive(Parser, Debug)]
#[command(
    name = "shopkeep-server",
    version,
    about = "Tool-calling chat server for retail analytics",
    long_about = "Proxies chat turns to an OpenAI-compatible model and lets it call local tools:\n\
                  a calculator, an FAQ lookup, and sales / inventory / pricing analytics over CSV data.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  shopkeep-server                      # Start the server (reads shopkeep.toml if present)\n    \
                  shopkeep-server --port 8080          # Override the listening port\n    \
                  shopkeep-server tools --retail       # Print the retail tool definitions\n    \
                  shopkeep-server config               # Print the effective configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "shopkeep.toml", global = true)]
    pub config: PathBuf,

    /// Address to bind (overrides config and HOST)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print tool definitions as JSON, exactly as they are offered to the model
    Tools {
        /// Show the retail tool set instead of the general one
        #[arg(long)]
        retail: bool,
    },

    /// Print the effective configuration with the API key redacted
    Config,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run; no subcommand means `serve`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
