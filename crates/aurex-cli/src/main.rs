//! aurex: browse the resources of BioWare Aurora games from the terminal.
//!
//! `aurex tree` lists a game directory with its archives opened in place,
//! `aurex info` describes a single file or archive member.

mod cli;
mod commands;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::Context;
use aurex_core::{Backends, Config, ResourceTree, TreeOptions};
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let level = logging::level(cli.verbose, &config.logging)?;
    logging::init(level, &config.logging)?;

    match cli.command {
        Commands::Tree { root, depth } => {
            let mut tree = open_tree(&root, &config)?;
            let (listing, errors) = commands::render_tree(&mut tree, depth);
            print!("{listing}");
            for (path, err) in errors {
                eprintln!("{}: {}", path.display(), err.chain_message());
            }
        }
        Commands::Info { root, path, json } => {
            let mut tree = open_tree(&root, &config)?;
            let id = tree
                .resolve(&path)
                .map_err(|e| anyhow::anyhow!(e.chain_message()))?;
            let report = commands::info_report(&mut tree, id, config.preview.text_max_lines)
                .with_context(|| format!("no item at {path}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", commands::render_info(&report));
            }
        }
    }
    Ok(())
}

fn open_tree(root: &Path, config: &Config) -> anyhow::Result<ResourceTree> {
    let backends = Backends {
        options: TreeOptions::from_config(config),
        ..Backends::default()
    };
    ResourceTree::open_with(root, backends)
        .with_context(|| format!("failed to open {}", root.display()))
}

/// An explicit `--config` must load; the default location is optional.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let path = default_config_path();
    if path.exists() {
        Config::load(&path).with_context(|| format!("failed to load config {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

/// `~/.config/aurex/config.toml`
fn default_config_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".config")
        .join("aurex")
        .join("config.toml")
}
