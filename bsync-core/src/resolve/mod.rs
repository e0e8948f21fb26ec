// bsync-core/src/resolve/mod.rs
//! Interactive reconciliation of the Brewfile with the installed set.
//!
//! ```text
//! dump -> diff -> in sync?                      -> done
//!                 otherwise ask:
//!                   1 merge -> write -> watch -> editor loop -> cleanup -> done
//!                   2 cleanup                                           -> done
//!                   3 nothing                                           -> done
//!                   4 exit
//! ```
//!
//! While the editor loop runs, an interrupt checks the Brewfile out of git
//! again so a half-finished merge never stays on disk.
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bsync_common::config::{scratch_path_for, Config};
use bsync_common::error::{BsyncError, Result};
use bsync_common::model::{DiffResult, SENTINEL_CATEGORY};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::brew::PackageManager;
use crate::git::VersionControl;
use crate::manifest::{contains_sentinel, read_manifest, write_manifest};
use crate::reconcile::{diff_manifests, merge_diff};

pub mod prompt;
pub mod watcher;

pub use prompt::Choice;
pub use watcher::{InterruptSource, WatchGuard, WatchOutcome};

/// Editor sessions allowed before giving up on uncategorized entries.
pub const MAX_EDITOR_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to reconcile.
    InSync,
    /// The Brewfile was merged, edited and cleaned up against.
    Updated,
    CleanedUp,
    /// The user chose to leave everything as it is.
    Unchanged,
    /// The user chose to exit; callers should stop here.
    Exited,
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub include_gui: bool,
    pub cleanup_force: bool,
    /// Merge into a Brewfile that has uncommitted changes. An interrupt
    /// would check those changes out too.
    pub allow_dirty: bool,
}

impl ResolveOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_gui: config.include_gui,
            cleanup_force: config.cleanup_force,
            allow_dirty: false,
        }
    }
}

pub struct Resolver {
    package_manager: Arc<dyn PackageManager>,
    vcs: Arc<dyn VersionControl>,
    manifest_path: PathBuf,
    scratch_path: PathBuf,
    options: ResolveOptions,
    interrupt: InterruptSource,
}

impl Resolver {
    pub fn new(
        package_manager: Arc<dyn PackageManager>,
        vcs: Arc<dyn VersionControl>,
        manifest_path: impl Into<PathBuf>,
        options: ResolveOptions,
    ) -> Self {
        let manifest_path = manifest_path.into();
        Self {
            package_manager,
            vcs,
            scratch_path: scratch_path_for(&manifest_path),
            manifest_path,
            options,
            interrupt: InterruptSource::OsSignals,
        }
    }

    pub fn with_interrupt_source(mut self, interrupt: InterruptSource) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Dumps the installed set and compares it with the Brewfile.
    pub async fn compute_diff(&self) -> Result<DiffResult> {
        self.package_manager
            .dump_installed(&self.scratch_path, self.options.include_gui)
            .await
            .map_err(|e| BsyncError::phase("dump installed packages", e))?;

        let read = read_manifest(&self.manifest_path)
            .map_err(|e| BsyncError::phase("read Brewfile", e))
            .and_then(|declared| {
                let actual = read_manifest(&self.scratch_path)
                    .map_err(|e| BsyncError::phase("read dump", e))?;
                Ok((declared, actual))
            });
        if let Err(e) = fs::remove_file(&self.scratch_path) {
            debug!("Could not remove {}: {}", self.scratch_path.display(), e);
        }
        let (declared, actual) = read?;

        let diff = diff_manifests(&declared, &actual);
        debug!(
            "{} added, {} removed",
            diff.added.len(),
            diff.removed.len()
        );
        Ok(diff)
    }

    /// Runs the whole protocol, reading the user's choice from `input`.
    #[instrument(skip(self, input), fields(manifest = %self.manifest_path.display()))]
    pub async fn run(&self, input: &mut dyn BufRead) -> Result<Outcome> {
        let diff = self.compute_diff().await?;
        if diff.is_empty() {
            println!("{}", "The Brewfile matches the installed packages.".green());
            return Ok(Outcome::InSync);
        }

        prompt::print_diff_and_choices(&diff);
        let choice = prompt::ask(input)?;
        debug!("User chose {:?}", choice);
        self.apply(choice, &diff).await
    }

    pub async fn apply(&self, choice: Choice, diff: &DiffResult) -> Result<Outcome> {
        match choice {
            Choice::UpdateFromActual => {
                self.update_from_actual(diff).await?;
                Ok(Outcome::Updated)
            }
            Choice::CleanupOnly => {
                self.cleanup().await?;
                Ok(Outcome::CleanedUp)
            }
            Choice::NoOp => {
                println!("Do nothing");
                Ok(Outcome::Unchanged)
            }
            Choice::Exit => {
                println!("Exit");
                Ok(Outcome::Exited)
            }
        }
    }

    async fn update_from_actual(&self, diff: &DiffResult) -> Result<()> {
        if !self.options.allow_dirty
            && self
                .vcs
                .has_uncommitted_changes(&self.manifest_path)
                .await
                .map_err(|e| BsyncError::phase("check Brewfile status", e))?
        {
            return Err(BsyncError::Config(format!(
                "{} has uncommitted changes that an interrupt would discard; commit them or pass --allow-dirty",
                self.manifest_path.display()
            )));
        }

        let base = read_manifest(&self.manifest_path)
            .map_err(|e| BsyncError::phase("read Brewfile", e))?;
        let merged = merge_diff(&base, &diff.added, &diff.removed);
        write_manifest(&self.manifest_path, &merged)
            .map_err(|e| BsyncError::phase("write Brewfile", e))?;

        let guard = WatchGuard::spawn(
            Arc::clone(&self.vcs),
            self.manifest_path.clone(),
            &self.interrupt,
        );

        println!();
        println!("{}", "> [!NOTE]".cyan().bold());
        println!(
            "{}",
            "> If you do not want to change it, interrupt the process (ctrl + c)".cyan()
        );

        let result = match self.resolve_with_editor(guard.token()).await {
            Ok(()) => self.cleanup().await,
            Err(e) => Err(e),
        };
        match guard.complete().await {
            WatchOutcome::Completed => result,
            WatchOutcome::Reverted => {
                if let Err(e) = result {
                    debug!("Discarding error from the interrupted session: {}", e);
                }
                Err(BsyncError::phase("update Brewfile", BsyncError::Interrupted))
            }
        }
    }

    /// Opens the merge tool until the sentinel heading is gone, at most
    /// [`MAX_EDITOR_ATTEMPTS`] times.
    async fn resolve_with_editor(&self, cancel: &CancellationToken) -> Result<()> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if attempts > MAX_EDITOR_ATTEMPTS {
                println!("{}", "> [!CAUTION]".red().bold());
                println!("{}", "> Abort because the Brewfile was not updated".red());
                return Err(BsyncError::phase(
                    "editor",
                    BsyncError::ResolutionExhausted {
                        attempts: MAX_EDITOR_ATTEMPTS,
                    },
                ));
            }

            debug!("Editor attempt {}/{}", attempts, MAX_EDITOR_ATTEMPTS);
            self.vcs
                .launch_diff_tool(&self.manifest_path, cancel)
                .await
                .map_err(|e| BsyncError::phase("editor", e))?;
            if cancel.is_cancelled() {
                return Err(BsyncError::Interrupted);
            }

            let text = fs::read_to_string(&self.manifest_path)
                .map_err(|e| BsyncError::file_io("read", &self.manifest_path, e))?;
            if !contains_sentinel(&text) {
                return Ok(());
            }

            warn!("Brewfile still has a '{}' section", SENTINEL_CATEGORY);
            println!("{}", "> [!CAUTION]".red().bold());
            println!(
                "{}",
                format!("> Update your Brewfile: move the entries under '# {SENTINEL_CATEGORY}' into categories")
                    .red()
            );
        }
    }

    async fn cleanup(&self) -> Result<()> {
        println!("Running `brew bundle cleanup`");
        self.package_manager
            .cleanup(&self.manifest_path, self.options.cleanup_force)
            .await
            .map_err(|e| BsyncError::phase("cleanup", e))
    }
}
