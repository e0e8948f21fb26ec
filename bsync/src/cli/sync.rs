use std::io;

use bsync_common::config::Config;
use bsync_common::error::Result;
use bsync_core::{Outcome, ResolveOptions};
use clap::Args;
use tracing::debug;

use crate::cli::fmt::format_brewfile;
use crate::cli::install::install_brewfile;
use crate::cli::{header, resolver};

/// Reconcile the Brewfile with the installed packages, then format and install
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skip the diff and go straight to formatting and installing
    #[arg(long)]
    pub force: bool,

    /// Stop after formatting the Brewfile
    #[arg(long)]
    pub no_install: bool,

    /// Merge even if the Brewfile has uncommitted changes
    #[arg(long)]
    pub allow_dirty: bool,
}

impl SyncArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        if self.force {
            debug!("--force given, skipping reconciliation");
        } else {
            header("Comparing the Brewfile with installed packages");
            let mut options = ResolveOptions::from_config(config);
            options.allow_dirty = self.allow_dirty;

            let stdin = io::stdin();
            let mut input = stdin.lock();
            let outcome = resolver(config, options).run(&mut input).await?;
            debug!("Reconciliation finished: {:?}", outcome);
            if outcome == Outcome::Exited {
                return Ok(());
            }
        }

        format_brewfile(config)?;
        if self.no_install {
            return Ok(());
        }
        install_brewfile(config).await
    }
}
