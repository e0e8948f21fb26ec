use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result};
use clap::Args;

use crate::cli::{header, package_manager};

/// Uninstall everything the Brewfile does not declare
#[derive(Args, Debug)]
pub struct Cleanup {
    /// Only list what would be removed
    #[arg(long)]
    pub no_force: bool,
}

impl Cleanup {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let force = config.cleanup_force && !self.no_force;
        header("Running `brew bundle cleanup`");
        package_manager(config)
            .cleanup(config.manifest_path(), force)
            .await
            .map_err(|e| BsyncError::phase("cleanup", e))
    }
}
