// bsync-core/src/resolve/watcher.rs
//! Rolls the Brewfile back when the user interrupts an editing session.
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bsync_common::error::BsyncError;
use colored::Colorize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::git::VersionControl;

/// What interrupts a resolution session.
#[derive(Debug, Clone, Default)]
pub enum InterruptSource {
    /// SIGINT, and SIGTERM on unix.
    #[default]
    OsSignals,
    /// Cancelling this token (or a parent of it) interrupts the session.
    Token(CancellationToken),
}

/// Resolves on SIGINT or SIGTERM.
///
/// Once called, tokio keeps its handler installed for the rest of the
/// process, so a later ctrl-c no longer terminates bsync by itself. Child
/// processes in the same process group still receive it and fail, which
/// ends the command with their error.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => debug!("Received SIGINT"),
        _ = terminate => debug!("Received SIGTERM"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The session finished before any interrupt.
    Completed,
    /// An interrupt arrived first and the Brewfile was checked out again.
    Reverted,
}

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const REVERTING: u8 = 2;

/// Background watcher for one resolution session.
///
/// `interrupt` fires on a signal, `stop` only on [`WatchGuard::complete`].
/// Whichever side moves `state` out of `RUNNING` first decides the outcome.
pub struct WatchGuard {
    state: Arc<AtomicU8>,
    interrupt: CancellationToken,
    stop: CancellationToken,
    handle: JoinHandle<WatchOutcome>,
    listener: Option<JoinHandle<()>>,
}

impl WatchGuard {
    pub fn spawn(vcs: Arc<dyn VersionControl>, manifest: PathBuf, source: &InterruptSource) -> Self {
        let state = Arc::new(AtomicU8::new(RUNNING));
        let stop = CancellationToken::new();
        let (interrupt, listener) = match source {
            InterruptSource::Token(parent) => (parent.child_token(), None),
            InterruptSource::OsSignals => {
                let interrupt = CancellationToken::new();
                let token = interrupt.clone();
                let stopped = stop.clone();
                let listener = tokio::spawn(async move {
                    tokio::select! {
                        _ = shutdown_signal() => token.cancel(),
                        _ = stopped.cancelled() => {}
                    }
                });
                (interrupt, Some(listener))
            }
        };

        let handle = tokio::spawn(watch(
            vcs,
            manifest,
            interrupt.clone(),
            stop.clone(),
            Arc::clone(&state),
        ));
        Self {
            state,
            interrupt,
            stop,
            handle,
            listener,
        }
    }

    /// Fires when the session is interrupted.
    pub fn token(&self) -> &CancellationToken {
        &self.interrupt
    }

    /// Ends the session. Returns [`WatchOutcome::Reverted`] if an interrupt
    /// arrived first, after the rollback has finished.
    pub async fn complete(self) -> WatchOutcome {
        if self.interrupt.is_cancelled() {
            debug!("Session was interrupted before it finished");
            return self.join().await;
        }
        if self
            .state
            .compare_exchange(RUNNING, FINISHED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.stop.cancel();
        }
        self.join().await
    }

    async fn join(self) -> WatchOutcome {
        let outcome = match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Brewfile watcher task failed: {}", e);
                WatchOutcome::Completed
            }
        };
        if let Some(listener) = self.listener {
            listener.abort();
        }
        outcome
    }
}

async fn watch(
    vcs: Arc<dyn VersionControl>,
    manifest: PathBuf,
    interrupt: CancellationToken,
    stop: CancellationToken,
    state: Arc<AtomicU8>,
) -> WatchOutcome {
    tokio::select! {
        _ = interrupt.cancelled() => {}
        _ = stop.cancelled() => {}
    }
    if state
        .compare_exchange(RUNNING, REVERTING, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        debug!("Session finished, watcher exiting");
        return WatchOutcome::Completed;
    }

    println!();
    println!("{}", "> [!WARNING]".yellow().bold());
    println!("{}", "> The Brewfile changes have been discarded.".yellow());

    match vcs.checkout_file(&manifest).await {
        Ok(()) => {
            debug!("Reverted {}", manifest.display());
            WatchOutcome::Reverted
        }
        Err(e) => {
            // The Brewfile may now match neither git nor the installed set.
            let err = BsyncError::RevertFailed(format!("{}: {}", manifest.display(), e));
            error!("{}", err);
            eprintln!("{}: {}", "Fatal".red().bold(), err);
            std::process::abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use bsync_common::error::Result;

    use super::*;

    #[derive(Default)]
    struct CountingGit {
        checkouts: AtomicUsize,
    }

    #[async_trait]
    impl VersionControl for CountingGit {
        async fn checkout_file(&self, _path: &Path) -> Result<()> {
            self.checkouts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn launch_diff_tool(&self, _path: &Path, _cancel: &CancellationToken) -> Result<()> {
            Ok(())
        }

        async fn has_uncommitted_changes(&self, _path: &Path) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn completing_never_reverts() {
        let git = Arc::new(CountingGit::default());
        let interrupt = CancellationToken::new();
        for _ in 0..50 {
            let guard = WatchGuard::spawn(
                git.clone(),
                PathBuf::from("Brewfile"),
                &InterruptSource::Token(interrupt.clone()),
            );
            tokio::task::yield_now().await;
            assert_eq!(guard.complete().await, WatchOutcome::Completed);
        }
        assert_eq!(git.checkouts.load(Ordering::SeqCst), 0);
        assert!(!interrupt.is_cancelled());
    }

    #[tokio::test]
    async fn interrupt_reverts_once() {
        let git = Arc::new(CountingGit::default());
        let interrupt = CancellationToken::new();
        let guard = WatchGuard::spawn(
            git.clone(),
            PathBuf::from("Brewfile"),
            &InterruptSource::Token(interrupt.clone()),
        );

        interrupt.cancel();
        assert!(guard.token().is_cancelled());
        assert_eq!(guard.complete().await, WatchOutcome::Reverted);
        assert_eq!(git.checkouts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn interrupt_just_before_complete_still_reverts() {
        let git = Arc::new(CountingGit::default());
        for _ in 0..100 {
            let interrupt = CancellationToken::new();
            let guard = WatchGuard::spawn(
                git.clone(),
                PathBuf::from("Brewfile"),
                &InterruptSource::Token(interrupt.clone()),
            );
            interrupt.cancel();
            assert_eq!(guard.complete().await, WatchOutcome::Reverted);
        }
        assert_eq!(git.checkouts.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn interrupt_after_complete_is_ignored() {
        let git = Arc::new(CountingGit::default());
        let interrupt = CancellationToken::new();
        let guard = WatchGuard::spawn(
            git.clone(),
            PathBuf::from("Brewfile"),
            &InterruptSource::Token(interrupt.clone()),
        );
        assert_eq!(guard.complete().await, WatchOutcome::Completed);
        interrupt.cancel();
        tokio::task::yield_now().await;
        assert_eq!(git.checkouts.load(Ordering::SeqCst), 0);
    }
}
