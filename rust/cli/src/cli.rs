//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tablelog", version, about = "Live hold'em hand recorder")]
pub struct TablelogCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from
    Cfg,
    /// Run a hand script and write the finished hands as JSONL
    Record {
        #[arg(long)]
        script: String,
        /// Destination file; stdout when omitted
        #[arg(long)]
        output: Option<String>,
    },
    /// Print recorded hands street by street
    Replay {
        #[arg(long)]
        input: String,
    },
    /// Re-check pot, payout and board consistency of recorded hands
    Verify {
        #[arg(long)]
        input: String,
    },
}
