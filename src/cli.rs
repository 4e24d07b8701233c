//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gcron", version)]
#[command(about = "Open source distributed job scheduling system", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Runs a gcron agent
    Agent {
        /// Load configuration from FILE
        #[arg(long = "config-file", value_name = "FILE")]
        config_file: Option<PathBuf>,
    },
}
