use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meta-model parameter CLI
#[derive(Parser)]
#[command(name = "metamod")]
#[command(version, about = "Fill meta-model template parameters and generate model files", long_about = None)]
pub struct CliCommand {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show per-file parameter completeness
    Status {
        /// Project root directory
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// JSON file binding parameter names to corpus type ids
        #[arg(long, value_name = "FILE")]
        types: Option<PathBuf>,
    },
    /// Re-walk the project tree and merge changed templates
    Rescan {
        /// Project root directory
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// JSON file binding parameter names to corpus type ids
        #[arg(long, value_name = "FILE")]
        types: Option<PathBuf>,

        /// Drop records whose backing file vanished from disk
        #[arg(long)]
        prune: bool,
    },
    /// Generate output files from the registered templates
    Generate {
        /// Project root directory
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// JSON file binding parameter names to corpus type ids
        #[arg(long, value_name = "FILE")]
        types: Option<PathBuf>,

        /// Stop at the first failing file instead of collecting failures
        #[arg(long)]
        fail_fast: bool,
    },
}
