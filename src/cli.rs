use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "ladder challenge negotiation and rating backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Create the database schema
    Init,
    /// Load teams and their home maps from a JSON file
    Import {
        /// Path to a JSON array of teams
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Replay a season and rewrite its stored ratings
    Recompute {
        /// Season to recompute (defaults to the current season)
        #[arg(short, long)]
        season: Option<u32>,
    },
    /// Print the standings table of a season
    Standings {
        #[arg(short, long)]
        season: Option<u32>,
    },
    /// Print one challenge as JSON
    Show {
        #[arg(short, long)]
        challenge: i64,
    },
}
