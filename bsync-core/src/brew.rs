// bsync-core/src/brew.rs
//! `brew bundle` as the package-manager collaborator.
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result};
use tracing::debug;

use crate::process;

#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Writes the installed set to `path` in Brewfile syntax.
    async fn dump_installed(&self, path: &Path, include_gui: bool) -> Result<()>;

    async fn install_from_manifest(&self, path: &Path) -> Result<()>;

    /// Uninstalls everything that is installed but not listed in `path`.
    async fn cleanup(&self, path: &Path, force: bool) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BrewBundle {
    brew_bin: String,
}

impl BrewBundle {
    pub fn new(brew_bin: impl Into<String>) -> Self {
        Self {
            brew_bin: brew_bin.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.brew_bin.clone())
    }

    async fn bundle(&self, args: Vec<String>) -> Result<()> {
        let mut full = vec!["bundle".to_string()];
        full.extend(args);
        process::run_streaming(&self.brew_bin, &full, None).await
    }
}

fn file_arg(path: &Path) -> [String; 2] {
    ["--file".to_string(), path.to_string_lossy().into_owned()]
}

pub(crate) fn dump_args(path: &Path, include_gui: bool) -> Vec<String> {
    let mut args = vec!["dump".to_string(), "--tap".to_string(), "--formula".to_string()];
    if include_gui {
        args.push("--cask".to_string());
        args.push("--mas".to_string());
    }
    args.extend(file_arg(path));
    args
}

pub(crate) fn cleanup_args(path: &Path, force: bool) -> Vec<String> {
    let mut args = vec!["cleanup".to_string()];
    if force {
        args.push("--force".to_string());
    }
    args.extend(file_arg(path));
    args
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("Removing stale dump {}", path.display());
        fs::remove_file(path).map_err(|e| BsyncError::file_io("remove", PathBuf::from(path), e))?;
    }
    Ok(())
}

#[async_trait]
impl PackageManager for BrewBundle {
    async fn dump_installed(&self, path: &Path, include_gui: bool) -> Result<()> {
        // `brew bundle dump` refuses to overwrite without --force.
        remove_stale(path)?;
        self.bundle(dump_args(path, include_gui)).await
    }

    async fn install_from_manifest(&self, path: &Path) -> Result<()> {
        let mut args = vec!["install".to_string()];
        args.extend(file_arg(path));
        self.bundle(args).await
    }

    async fn cleanup(&self, path: &Path, force: bool) -> Result<()> {
        self.bundle(cleanup_args(path, force)).await
    }
}
