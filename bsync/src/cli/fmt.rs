use bsync_common::config::Config;
use bsync_common::error::Result;
use bsync_core::manifest::format_manifest_file;
use clap::Args;

use crate::cli::header;

/// Rewrite the Brewfile in canonical form
#[derive(Args, Debug)]
pub struct Fmt;

impl Fmt {
    pub async fn run(&self, config: &Config) -> Result<()> {
        format_brewfile(config)
    }
}

pub(crate) fn format_brewfile(config: &Config) -> Result<()> {
    header(&format!("Formatting {}", config.manifest_path().display()));
    let manifest = format_manifest_file(config.manifest_path())?;
    println!("{} entries written", manifest.len());
    Ok(())
}
