// bsync-core/src/process.rs
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use bsync_common::error::{BsyncError, Result};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

fn build_command<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.kill_on_drop(true); // Ensure process is killed if the command handle is dropped
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd
}

fn describe(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn check_status(tool: String, status: ExitStatus) -> Result<()> {
    if status.success() {
        debug!("Command finished successfully: {}", tool);
        return Ok(());
    }
    debug!("Command failed with status {}: {}", status, tool);
    Err(BsyncError::ExternalTool {
        tool,
        status: status.to_string(),
    })
}

/// Runs a command with the terminal attached and fails on a non-zero exit.
pub async fn run_streaming(program: &str, args: &[String], cwd: Option<&Path>) -> Result<()> {
    debug!("Running command: {} {:?} (cwd: {:?})", program, args, cwd);
    let mut cmd = build_command(program, args, cwd);
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    let status = cmd.status().await.map_err(|e| {
        error!("Failed to execute {}: {}", program, e);
        BsyncError::from(e)
    })?;
    check_status(describe(program, args), status)
}

/// Like [`run_streaming`], but kills the child and returns
/// [`BsyncError::Interrupted`] once `cancel` fires.
pub async fn run_interactive(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    debug!("Running interactive command: {} {:?} (cwd: {:?})", program, args, cwd);
    if cancel.is_cancelled() {
        return Err(BsyncError::Interrupted);
    }

    let mut cmd = build_command(program, args, cwd);
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());
    let mut child = cmd.spawn().map_err(|e| {
        error!("Failed to execute {}: {}", program, e);
        BsyncError::from(e)
    })?;

    tokio::select! {
        status = child.wait() => {
            check_status(describe(program, args), status?)
        }
        _ = cancel.cancelled() => {
            debug!("Cancelled, killing {}", program);
            if let Err(e) = child.kill().await {
                debug!("Could not kill {}: {}", program, e);
            }
            Err(BsyncError::Interrupted)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn successful_command_is_ok() {
        run_streaming("sh", &args(&["-c", "exit 0"]), None).await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_external_tool_error() {
        let err = run_streaming("sh", &args(&["-c", "exit 3"]), None)
            .await
            .unwrap_err();
        match err {
            BsyncError::ExternalTool { tool, status } => {
                assert_eq!(tool, "sh -c exit 3");
                assert!(status.contains('3'), "{status}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let err = run_streaming("bsync-no-such-program", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, BsyncError::Io(_)));
    }

    #[tokio::test]
    async fn interactive_command_is_killed_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let err = run_interactive("sleep", &args(&["30"]), None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, BsyncError::Interrupted));
    }
}
