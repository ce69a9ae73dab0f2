use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carmap")]
#[command(about = "Maps car catalog entries between two market catalogs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Source catalog file, annotated in place with mapped names
    #[arg(long, global = true, default_value = "data/source_catalog.json")]
    pub source: PathBuf,

    /// Target catalog file, never written
    #[arg(long, global = true, default_value = "data/target_catalog.json")]
    pub target: PathBuf,

    /// Session progress file
    #[arg(long, global = true, default_value = "data/mapping_progress.json")]
    pub progress: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the brand-by-brand mapping session
    Map {
        /// Jump to this brand instead of asking how to start
        #[arg(long, conflicts_with = "restart")]
        from_brand: Option<String>,

        /// Ignore saved progress and start from the first brand
        #[arg(long)]
        restart: bool,

        /// Skip the AI suggestion stage even when configured
        #[arg(long)]
        no_ai: bool,
    },

    /// Clear every mapping recorded by the current session
    Undo,

    /// Show catalog totals and mapping coverage
    Stats {
        /// Show the model list of a single brand instead
        #[arg(long)]
        brand: Option<String>,
    },

    /// Write a reverse index keyed by mapped target name
    Index {
        /// Output file for the index
        #[arg(short, long, default_value = "data/mapping_index.json")]
        out: PathBuf,
    },
}
