// bsync-core/src/reconcile/diff.rs
use std::collections::HashSet;

use bsync_common::model::{DiffResult, Manifest};

/// Compares the declared Brewfile with a dump of what is installed.
///
/// `removed` holds declared entries that are not installed, in declared
/// order. `added` holds installed entries that are not declared, in dump
/// order. Entries match on `(type, name)`; categories and extra clauses are
/// ignored.
pub fn diff_manifests(declared: &Manifest, actual: &Manifest) -> DiffResult {
    let installed: HashSet<_> = actual.iter().map(|e| e.key()).collect();
    let mut found = HashSet::new();
    let mut result = DiffResult::default();

    for entry in declared {
        if installed.contains(&entry.key()) {
            found.insert(entry.key());
        } else {
            result.removed.push(entry.clone());
        }
    }

    result.added = actual
        .iter()
        .filter(|e| !found.contains(&e.key()))
        .cloned()
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use bsync_common::model::{BundleType, ManifestEntry};

    use super::*;

    fn sample() -> Manifest {
        vec![
            ManifestEntry::new(BundleType::Tap, "homebrew/bundle").with_categories(["Core"]),
            ManifestEntry::new(BundleType::Formula, "git").with_categories(["cat 1", "cat 1.1"]),
            ManifestEntry::new(BundleType::Cask, "iterm2").with_categories(["Apps"]),
            ManifestEntry::new(BundleType::StoreApp, "Xcode").with_others(["id: 497799835"]),
        ]
        .into()
    }

    #[test]
    fn identical_sets_have_no_diff() {
        let m = sample();
        assert!(diff_manifests(&m, &m).is_empty());
    }

    #[test]
    fn missing_install_is_removed() {
        let declared = sample();
        let actual: Manifest = declared
            .iter()
            .filter(|e| e.name != "iterm2")
            .cloned()
            .collect();

        let diff = diff_manifests(&declared, &actual);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].name, "iterm2");
        assert_eq!(diff.removed[0].categories, vec!["Apps".to_string()]);
    }

    #[test]
    fn extra_install_is_added() {
        let declared = sample();
        let mut actual = declared.clone();
        actual.push(ManifestEntry::new(BundleType::Cask, "vlc"));

        let diff = diff_manifests(&declared, &actual);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.added, vec![ManifestEntry::new(BundleType::Cask, "vlc")]);
    }

    #[test]
    fn category_differences_are_not_a_diff() {
        let declared = sample();
        let actual: Manifest = declared
            .iter()
            .cloned()
            .map(|mut e| {
                e.categories.clear();
                e
            })
            .collect();
        assert!(diff_manifests(&declared, &actual).is_empty());
    }

    #[test]
    fn same_name_different_type_is_a_different_unit() {
        let declared: Manifest = vec![ManifestEntry::new(BundleType::Formula, "docker")].into();
        let actual: Manifest = vec![ManifestEntry::new(BundleType::Cask, "docker")].into();

        let diff = diff_manifests(&declared, &actual);
        assert_eq!(diff.removed[0].bundle_type, BundleType::Formula);
        assert_eq!(diff.added[0].bundle_type, BundleType::Cask);
    }
}
