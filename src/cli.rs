/// CLI argument parsing

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

// Build timestamp injected at compile time
pub const VERSION_WITH_BUILD: &str = concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

// Get version with timestamp
pub fn get_version() -> &'static str {
    VERSION_WITH_BUILD
}

#[derive(Parser, Debug)]
#[command(name = "dhm")]
#[command(author, version = VERSION_WITH_BUILD, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Start in Full mode (CPU and memory stats)
    #[arg(long, global = true)]
    pub full: bool,

    /// Config file (default: <config dir>/dhm/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file (default: <data dir>/dhm/dhm.log)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Collect once and print containers ranked by health
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
