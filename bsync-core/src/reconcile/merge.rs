// bsync-core/src/reconcile/merge.rs
use bsync_common::model::{Manifest, ManifestEntry, SENTINEL_CATEGORY};
use tracing::{debug, warn};

/// Folds a diff back into the declared manifest.
///
/// Added entries are appended under the sentinel category so the user can
/// sort them into real headings. For each removed entry the first base entry
/// with the same name is dropped; the type is not compared.
pub fn merge_diff(base: &Manifest, added: &[ManifestEntry], removed: &[ManifestEntry]) -> Manifest {
    let mut merged = base.clone();

    for entry in added {
        let mut entry = entry.clone();
        entry.categories = vec![SENTINEL_CATEGORY.to_string()];
        debug!("Adding {} under '{}'", entry, SENTINEL_CATEGORY);
        merged.push(entry);
    }

    for entry in removed {
        match merged
            .position_by_name(&entry.name)
            .and_then(|index| merged.remove(index))
        {
            Some(dropped) => {
                if dropped.bundle_type != entry.bundle_type {
                    warn!(
                        "Removed '{}' as {} although the missing unit is a {}",
                        dropped.name, dropped.bundle_type, entry.bundle_type
                    );
                }
            }
            None => debug!("Nothing named '{}' left to remove", entry.name),
        }
    }

    merged
}
