use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "emby-duper")]
#[command(about = "Find and remove duplicate copies in an Emby library", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the configured server is reachable and the API key works
    TestConnection,
    /// List media libraries and their detected content type
    Libraries,
    /// Scan libraries and print a duplicate summary
    Scan {
        /// Also write a text report to the configured report directory
        #[arg(long)]
        report: bool,
    },
    /// Scan libraries and write a shell script removing safe duplicates
    Script {
        /// Where to write the script
        #[arg(short, long, default_value = "remove_duplicates.sh")]
        output: PathBuf,
    },
    /// Scan libraries and delete safe duplicates through the server API
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
}
