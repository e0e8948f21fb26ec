use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BsyncError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("Failed to {op} '{}': {source}", .path.display())]
    FileIo {
        op: &'static str,
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("Git Error: {0}")]
    Git(#[from] Arc<git2::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("'{tool}' exited with {status}")]
    ExternalTool { tool: String, status: String },

    #[error("Manifest still has uncategorized entries after {attempts} editor sessions")]
    ResolutionExhausted { attempts: usize },

    #[error("Interrupted, manifest changes were discarded")]
    Interrupted,

    #[error("Failed to revert the manifest after an interrupt: {0}")]
    RevertFailed(String),

    #[error("{0} failed: {1}")]
    Phase(&'static str, Box<BsyncError>),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl BsyncError {
    /// Attaches the name of the step that produced this error.
    pub fn phase(phase: &'static str, err: BsyncError) -> Self {
        BsyncError::Phase(phase, Box::new(err))
    }

    pub fn file_io(op: &'static str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        BsyncError::FileIo {
            op,
            path: path.into(),
            source: Arc::new(err),
        }
    }

    /// Strips any phase wrappers.
    pub fn root(&self) -> &BsyncError {
        match self {
            BsyncError::Phase(_, inner) => inner.root(),
            other => other,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.root(), BsyncError::Interrupted)
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_interrupted() {
            130
        } else {
            1
        }
    }
}

impl From<std::io::Error> for BsyncError {
    fn from(err: std::io::Error) -> Self {
        BsyncError::Io(Arc::new(err))
    }
}

impl From<git2::Error> for BsyncError {
    fn from(err: git2::Error) -> Self {
        BsyncError::Git(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_wrapping_keeps_root_and_exit_code() {
        let err = BsyncError::phase("editor", BsyncError::Interrupted);
        assert!(err.is_interrupted());
        assert_eq!(err.exit_code(), 130);
        assert_eq!(
            err.to_string(),
            "editor failed: Interrupted, manifest changes were discarded"
        );

        let err = BsyncError::phase(
            "editor",
            BsyncError::ResolutionExhausted { attempts: 3 },
        );
        assert!(matches!(
            err.root(),
            BsyncError::ResolutionExhausted { attempts: 3 }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn file_io_names_path_and_operation() {
        let err = BsyncError::file_io(
            "read",
            "/tmp/Brewfile",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "Failed to read '/tmp/Brewfile': gone");
    }
}
