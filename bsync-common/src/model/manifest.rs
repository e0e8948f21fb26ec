// bsync-common/src/model/manifest.rs
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::bundle::{BundleType, ManifestEntry};

/// Category given to entries that were found installed but not declared.
/// The user is expected to move them under a real heading.
pub const SENTINEL_CATEGORY: &str = "Added by bsync";

/// Ordered list of Brewfile entries.
///
/// A manifest is rebuilt from disk on every read and written out whole; it is
/// never patched in place between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn get(&self, bundle_type: BundleType, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.key() == (bundle_type, name))
    }

    pub fn contains(&self, bundle_type: BundleType, name: &str) -> bool {
        self.get(bundle_type, name).is_some()
    }

    /// Position of the first entry called `name`, whatever its type.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Removes the entry at `index`, or returns `None` if there is none.
    pub fn remove(&mut self, index: usize) -> Option<ManifestEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Entries whose `(type, name)` key already appeared earlier.
    pub fn duplicates(&self) -> Vec<&ManifestEntry> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| !seen.insert(e.key()))
            .collect()
    }

    pub fn has_sentinel_entries(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.categories.first().is_some_and(|c| c == SENTINEL_CATEGORY))
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Manifest {
    type Item = ManifestEntry;
    type IntoIter = std::vec::IntoIter<ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Difference between the declared and the installed set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Installed but not declared.
    pub added: Vec<ManifestEntry>,
    /// Declared but not installed.
    pub removed: Vec<ManifestEntry>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
