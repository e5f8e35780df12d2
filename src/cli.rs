//! Command-line interface for strictly_eriantys.

use strictly_eriantys::RuleVariant;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Eriantys - turn controller for Eriantys sessions
#[derive(Parser, Debug)]
#[command(name = "strictly_eriantys")]
#[command(about = "Runs Eriantys sessions from bots or scripts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Session settings shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// TOML session config; the flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of players (2 or 3)
    #[arg(short, long)]
    pub players: Option<u8>,

    /// Rule variant
    #[arg(long, value_enum)]
    pub variant: Option<RuleVariant>,

    /// Seed for the bag
    #[arg(long)]
    pub seed: Option<u64>,

    /// Round limit
    #[arg(long)]
    pub rounds: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a whole session between random bots
    Simulate {
        #[command(flatten)]
        session: SessionArgs,

        /// Print every notification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a command script against a fresh session
    Script {
        /// Path to the script
        path: PathBuf,

        #[command(flatten)]
        session: SessionArgs,

        /// Only print rejected commands and the final state
        #[arg(short, long)]
        quiet: bool,
    },
}
