//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shici - browse a classical poetry corpus and dictionary
#[derive(Parser, Debug)]
#[command(name = "shici", version, about = "Browse a classical poetry corpus and dictionary")]
pub struct Cli {
    /// Home directory for config.toml and history (default: SHICI_HOME or ~/.shici)
    #[arg(long, value_name = "DIR", global = true)]
    pub home: Option<PathBuf>,

    /// Data location: base URL or directory holding data/index.json
    #[arg(long, value_name = "URL|DIR", global = true)]
    pub data: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Turn on exam mode for this invocation (poem text is hidden)
    #[arg(long, global = true)]
    pub exam: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show one poem by id
    Poem { id: String },

    /// Search titles and authors (case-insensitive)
    Search { keyword: String },

    /// Show the first poems of the index
    Popular {
        /// Number of poems (default: popular_limit from config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List index entries in a category ("all" or omitted for everything)
    Category { id: Option<String> },

    /// Look a word up in the dictionary and record it in history
    Dict { word: String },

    /// Show dictionary lookup history
    History {
        /// Clear the history instead of showing it
        #[arg(long)]
        clear: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
