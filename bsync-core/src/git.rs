// bsync-core/src/git.rs
//! Git as the version-control collaborator.
//!
//! Index and status queries go through git2; `git difftool` has no library
//! equivalent and is run as a child process.
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result};
use git2::build::CheckoutBuilder;
use git2::{Repository, Status};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::process;

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Discards uncommitted changes to `path`.
    async fn checkout_file(&self, path: &Path) -> Result<()>;

    /// Opens the merge UI on `path` and blocks until it is closed or
    /// `cancel` fires.
    async fn launch_diff_tool(&self, path: &Path, cancel: &CancellationToken) -> Result<()>;

    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct Git {
    git_bin: String,
}

impl Git {
    pub fn new(git_bin: impl Into<String>) -> Self {
        Self {
            git_bin: git_bin.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.git_bin.clone())
    }
}

/// Opens the repository containing `path` and returns the path relative to
/// its working directory.
fn open_for(path: &Path) -> Result<(Repository, PathBuf)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| BsyncError::Config(format!("{} is not a file path", path.display())))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = fs::canonicalize(&parent).map_err(|e| BsyncError::file_io("resolve", &parent, e))?;

    let repo = Repository::discover(&parent).map_err(|e| {
        error!("No git repository around {}: {}", parent.display(), e);
        BsyncError::from(e)
    })?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| BsyncError::Config(format!("{} is in a bare repository", path.display())))?;
    let workdir = fs::canonicalize(workdir).map_err(|e| BsyncError::file_io("resolve", workdir, e))?;

    let relative = parent
        .strip_prefix(&workdir)
        .map_err(|_| {
            BsyncError::Config(format!(
                "{} is outside of {}",
                path.display(),
                workdir.display()
            ))
        })?
        .join(file_name);
    Ok((repo, relative))
}

fn checkout_file_blocking(path: &Path) -> Result<()> {
    let (repo, relative) = open_for(path)?;
    debug!("Restoring {} from the index", relative.display());
    let mut checkout = CheckoutBuilder::new();
    checkout.force().path(relative.as_path());
    repo.checkout_index(None, Some(&mut checkout))?;
    Ok(())
}

fn has_changes_blocking(path: &Path) -> Result<bool> {
    let (repo, relative) = open_for(path)?;
    let status = repo.status_file(&relative)?;
    debug!("git status of {}: {:?}", relative.display(), status);
    Ok(!status.is_empty() && !status.contains(Status::IGNORED))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BsyncError::Generic(format!("git task failed: {e}")))?
}

#[async_trait]
impl VersionControl for Git {
    async fn checkout_file(&self, path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        blocking(move || checkout_file_blocking(&path)).await
    }

    async fn launch_diff_tool(&self, path: &Path, cancel: &CancellationToken) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BsyncError::Config(format!("{} is not a file path", path.display())))?;
        let cwd = path.parent().filter(|p| !p.as_os_str().is_empty());
        let args = vec!["difftool".to_string(), "-y".to_string(), file_name];
        process::run_interactive(&self.git_bin, &args, cwd, cancel).await
    }

    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        let path = path.to_path_buf();
        blocking(move || has_changes_blocking(&path)).await
    }
}
