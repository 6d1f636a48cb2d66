use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse BioWare Aurora game data", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ~/.config/aurex/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resource tree below a game directory
    Tree {
        root: PathBuf,
        /// levels to expand, archives included
        #[arg(long, default_value_t = 1)]
        depth: usize,
    },
    /// Describe one item: sizes, types, image header or sound properties
    Info {
        root: PathBuf,
        /// `/`-separated path below ROOT; archive members continue through the archive name
        path: String,
        #[arg(long)]
        json: bool,
    },
}
