// bsync/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;
use std::sync::Arc;

use bsync_common::error::Result;
use bsync_common::Config;
use bsync_core::{BrewBundle, Git, PackageManager, ResolveOptions, Resolver, VersionControl};
use clap::{ArgAction, Parser, Subcommand};

pub mod cleanup;
pub mod diff;
pub mod fmt;
pub mod install;
pub mod sync;

use crate::cli::cleanup::Cleanup;
use crate::cli::diff::Diff;
use crate::cli::fmt::Fmt;
use crate::cli::install::Install;
use crate::cli::sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "bsync", bin_name = "bsync")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Brewfile to work on (defaults to BSYNC_MANIFEST, HOMEBREW_BUNDLE_FILE or ~/.Brewfile)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Sync(SyncArgs),
    Diff(Diff),
    Fmt(Fmt),
    Install(Install),
    Cleanup(Cleanup),
}

impl Command {
    pub async fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Sync(command) => command.run(config).await,
            Self::Diff(command) => command.run(config).await,
            Self::Fmt(command) => command.run(config).await,
            Self::Install(command) => command.run(config).await,
            Self::Cleanup(command) => command.run(config).await,
        }
    }
}

pub(crate) fn package_manager(config: &Config) -> Arc<dyn PackageManager> {
    Arc::new(BrewBundle::from_config(config))
}

pub(crate) fn resolver(config: &Config, options: ResolveOptions) -> Resolver {
    let vcs: Arc<dyn VersionControl> = Arc::new(Git::from_config(config));
    Resolver::new(
        package_manager(config),
        vcs,
        config.manifest_path().to_path_buf(),
        options,
    )
}

pub(crate) fn header(text: &str) {
    use colored::Colorize;
    println!("{}{}", "==> ".bold().blue(), text.bold());
}
