//! Command-line interface definition for MicroFavola
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for one-shot writing, the interactive session,
//! history management and the theme catalog.

use clap::{Parser, Subcommand};

/// MicroFavola - very short stories with a twist
///
/// Turn a few words into a micro-story in the theme of your choice.
#[derive(Parser, Debug, Clone)]
#[command(name = "microfavola")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the history database location
    #[arg(long, env = "MICROFAVOLA_STORAGE_PATH")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for MicroFavola
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate one story and print it
    Write {
        /// Keywords, a phrase or a short thought
        prompt: String,

        /// Theme id (noir, fantasy, fantascienza, horror, poetico, ironico)
        #[arg(short, long)]
        theme: Option<String>,

        /// Print the story as JSON instead of a formatted card
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive writing session
    Interactive {
        /// Theme selected at start
        #[arg(short, long)]
        theme: Option<String>,

        /// Keep history in memory only for this session
        #[arg(long)]
        ephemeral: bool,
    },

    /// Manage story history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// List the available themes
    Themes,
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List recent stories, newest first
    List,

    /// Print a story from history
    Show {
        /// Position in the list (1 is the newest)
        index: usize,
    },

    /// Delete all stories from history
    Clear,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
