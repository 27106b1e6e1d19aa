use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Timed flashcard drills in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Preference file holding cards and settings
    #[arg(short, long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Type in new cards
    Add,

    /// List all cards, topmost card last
    List,

    /// Delete the card at the given position
    Remove {
        #[arg(value_name = "INDEX")]
        index: usize,
    },

    /// Add cards from a `|`-separated CSV file
    Import {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Write all cards to a `|`-separated CSV file
    Export {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Show or change settings
    Settings {
        /// Put cards answered incorrectly back into the deck
        #[arg(long, value_name = "BOOL")]
        reuse_incorrect: Option<bool>,

        /// Shuffle the deck when a session starts
        #[arg(long, value_name = "BOOL")]
        shuffle: Option<bool>,
    },

    /// Start a timed review session
    Review,
}
