// bsync-core/src/manifest/mod.rs
//! Brewfile codec: text <-> [`Manifest`], plus whole-file helpers.
use std::fs;
use std::path::Path;

use bsync_common::error::{BsyncError, Result};
use bsync_common::model::{Manifest, SENTINEL_CATEGORY};
use tracing::{debug, warn};

mod parse;
mod write;

pub use parse::parse_manifest;
pub use write::serialize_manifest;

/// Heading line that marks entries still waiting to be categorized.
pub fn sentinel_heading() -> String {
    format!("{} {}", parse::HEADING_MARKER, SENTINEL_CATEGORY)
}

/// True while the sentinel heading is still present in Brewfile text.
pub fn contains_sentinel(text: &str) -> bool {
    text.contains(&sentinel_heading())
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    debug!("Reading Brewfile {}", path.display());
    let text = fs::read_to_string(path).map_err(|e| BsyncError::file_io("read", path, e))?;
    Ok(parse_manifest(&text))
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    debug!(
        "Writing {} entries to Brewfile {}",
        manifest.len(),
        path.display()
    );
    fs::write(path, serialize_manifest(manifest))
        .map_err(|e| BsyncError::file_io("write", path, e))
}

/// Rewrites a Brewfile in canonical form and returns what was written.
pub fn format_manifest_file(path: &Path) -> Result<Manifest> {
    let manifest = read_manifest(path)?;
    for dup in manifest.duplicates() {
        warn!(
            "Duplicate Brewfile entry {} under '{}'",
            dup,
            dup.categories.join(" / ")
        );
    }
    write_manifest(path, &manifest)?;
    Ok(manifest)
}
