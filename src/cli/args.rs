//! Command line argument definitions.

use crate::models::media::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media Identifier - Work out which film or TV episode a file is
#[derive(Parser, Debug)]
#[command(name = "media-identifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reverse-parse a file name with a rename pattern
    Parse {
        /// Rename pattern, e.g. "%n/Season %s/%e - %t.%x"
        #[arg(short, long)]
        pattern: String,

        /// Media directory root the pattern is relative to
        #[arg(short, long, value_name = "ROOT")]
        root: Option<PathBuf>,

        /// File to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the search term the strategy chain derives for a file
    Search {
        /// Media type: tv or film
        #[arg(short, long, default_value = "film")]
        mode: Mode,

        /// Rename pattern (defaults depend on the mode)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Media directory root (defaults to the file's directory)
        #[arg(short, long, value_name = "ROOT")]
        root: Option<PathBuf>,

        /// File to search for
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decide whether a file is a film or a TV episode
    Classify {
        /// File to classify
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Identify files using the stores of the configured media directories
    Identify {
        /// Configuration file (default: ~/.config/media_identifier/config.toml)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Search again instead of using the identity recorded for each file
        #[arg(long)]
        refresh: bool,

        /// File or directory to identify
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}
