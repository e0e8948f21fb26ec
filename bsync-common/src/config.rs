// bsync-common/src/config.rs
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};
use tracing::debug;

use super::error::{BsyncError, Result};

// `brew bundle` looks here when neither --file nor --global is given.
const DEFAULT_MANIFEST_FILENAME: &str = ".Brewfile";
const SCRATCH_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct Config {
    pub manifest_path: PathBuf,
    pub brew_bin: String,
    pub git_bin: String,
    /// Dump casks and App Store apps along with taps and formulae.
    pub include_gui: bool,
    /// Pass `--force` to `brew bundle cleanup`.
    pub cleanup_force: bool,
    pub logs_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading bsync configuration");

        let manifest_path = match non_empty_var("BSYNC_MANIFEST")
            .or_else(|| non_empty_var("HOMEBREW_BUNDLE_FILE"))
        {
            Some(path) => PathBuf::from(path),
            None => {
                let user_dirs = UserDirs::new().ok_or_else(|| {
                    BsyncError::Config(
                        "Could not determine the home directory; set BSYNC_MANIFEST".to_string(),
                    )
                })?;
                user_dirs.home_dir().join(DEFAULT_MANIFEST_FILENAME)
            }
        };
        debug!("Effective manifest path: {}", manifest_path.display());

        let logs_dir = BaseDirs::new()
            .map(|dirs| dirs.cache_dir().join("bsync").join("logs"))
            .unwrap_or_else(|| env::temp_dir().join("bsync-logs"));

        let config = Self {
            manifest_path,
            brew_bin: non_empty_var("BSYNC_BREW").unwrap_or_else(|| "brew".to_string()),
            git_bin: non_empty_var("BSYNC_GIT").unwrap_or_else(|| "git".to_string()),
            include_gui: !flag_is(env::var("BSYNC_NO_GUI").ok().as_deref(), "1")
                && cfg!(target_os = "macos"),
            cleanup_force: !flag_is(env::var("BSYNC_CLEANUP_FORCE").ok().as_deref(), "0"),
            logs_dir,
        };

        debug!("Configuration loaded successfully.");
        Ok(config)
    }

    /// Same configuration pointed at a different manifest.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }
}

/// `<manifest>.tmp`, next to the manifest. The installed set is dumped here
/// before diffing.
pub fn scratch_path_for(manifest: &Path) -> PathBuf {
    let mut name: OsString = manifest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("Brewfile"));
    name.push(SCRATCH_SUFFIX);
    manifest.with_file_name(name)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn flag_is(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| v.trim() == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_file_sits_next_to_manifest() {
        assert_eq!(
            scratch_path_for(Path::new("/home/me/dotfiles/Brewfile")),
            PathBuf::from("/home/me/dotfiles/Brewfile.tmp")
        );
        assert_eq!(
            scratch_path_for(Path::new("/home/me/.Brewfile")),
            PathBuf::from("/home/me/.Brewfile.tmp")
        );
    }

    #[test]
    fn with_manifest_replaces_the_path() {
        let config = Config {
            manifest_path: PathBuf::from("/a/Brewfile"),
            brew_bin: "brew".into(),
            git_bin: "git".into(),
            include_gui: true,
            cleanup_force: true,
            logs_dir: PathBuf::from("/tmp/logs"),
        }
        .with_manifest("/b/Brewfile");
        assert_eq!(config.manifest_path(), Path::new("/b/Brewfile"));
    }

    #[test]
    fn flags_compare_trimmed_values() {
        assert!(flag_is(Some(" 1 "), "1"));
        assert!(!flag_is(Some("true"), "1"));
        assert!(!flag_is(None, "0"));
    }
}
