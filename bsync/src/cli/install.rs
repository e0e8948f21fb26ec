use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result};
use clap::Args;

use crate::cli::{header, package_manager};

/// Install everything the Brewfile declares
#[derive(Args, Debug)]
pub struct Install;

impl Install {
    pub async fn run(&self, config: &Config) -> Result<()> {
        install_brewfile(config).await
    }
}

pub(crate) async fn install_brewfile(config: &Config) -> Result<()> {
    header("Running `brew bundle install`");
    package_manager(config)
        .install_from_manifest(config.manifest_path())
        .await
        .map_err(|e| BsyncError::phase("install", e))
}
