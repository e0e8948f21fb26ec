// bsync-core/src/manifest/write.rs
use std::collections::HashMap;

use bsync_common::model::{Manifest, ManifestEntry};

use super::parse::HEADING_MARKER;

struct Group<'a> {
    path: &'a [String],
    entries: Vec<&'a ManifestEntry>,
}

/// Renders a manifest as Brewfile text.
///
/// Entries are grouped by category path in the order the paths first appear,
/// and sorted by `(type, name)` inside a group. The output is deterministic
/// for a given manifest.
pub fn serialize_manifest(manifest: &Manifest) -> String {
    let mut out = String::new();
    let mut previous: &[String] = &[];

    for group in group_by_categories(manifest) {
        let start = first_changed_depth(previous, group.path);
        for (depth, title) in group.path.iter().enumerate().skip(start) {
            if depth == 0 && !out.is_empty() {
                out.push('\n');
            }
            for _ in 0..=depth {
                out.push(HEADING_MARKER);
            }
            out.push(' ');
            out.push_str(title);
            out.push('\n');
        }

        for entry in group.entries {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        previous = group.path;
    }

    out
}

fn group_by_categories(manifest: &Manifest) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut index: HashMap<&[String], usize> = HashMap::new();

    for entry in manifest {
        let path = entry.categories.as_slice();
        let slot = *index.entry(path).or_insert_with(|| {
            groups.push(Group {
                path,
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entries.push(entry);
    }

    // A group without headings can only be expressed at the top of the file.
    if let Some(pos) = groups.iter().position(|g| g.path.is_empty()) {
        let uncategorized = groups.remove(pos);
        groups.insert(0, uncategorized);
    }

    for group in &mut groups {
        group
            .entries
            .sort_by(|a, b| (a.bundle_type, &a.name).cmp(&(b.bundle_type, &b.name)));
    }
    groups
}

/// Index of the first heading that has to be written to move the parser's
/// category stack from `previous` to `current`.
fn first_changed_depth(previous: &[String], current: &[String]) -> usize {
    let common = previous
        .iter()
        .zip(current)
        .take_while(|(p, c)| p == c)
        .count();

    if common == current.len() && previous.len() > current.len() {
        // `current` is a prefix of `previous`: repeat its last heading so the
        // deeper levels get popped.
        current.len().saturating_sub(1)
    } else {
        common
    }
}

#[cfg(test)]
mod tests {
    use bsync_common::model::BundleType;

    use super::*;
    use crate::manifest::parse_manifest;

    fn entry(t: BundleType, name: &str, cats: &[&str]) -> ManifestEntry {
        ManifestEntry::new(t, name).with_categories(cats.iter().copied())
    }

    #[test]
    fn groups_keep_first_seen_order_and_sort_inside() {
        let manifest: Manifest = vec![
            entry(BundleType::Formula, "zsh", &["Shell"]),
            entry(BundleType::Cask, "alacritty", &["Apps"]),
            entry(BundleType::Formula, "bash", &["Shell"]),
            entry(BundleType::Tap, "homebrew/cask-fonts", &["Shell"]),
        ]
        .into();

        let text = serialize_manifest(&manifest);
        assert_eq!(
            text,
            "\
# Shell
tap \"homebrew/cask-fonts\"
brew \"bash\"
brew \"zsh\"

# Apps
cask \"alacritty\"
"
        );
    }

    #[test]
    fn nested_headings_are_written_where_the_path_changes() {
        let manifest: Manifest = vec![
            entry(BundleType::Formula, "git", &["cat 1", "cat 1.1"]),
            entry(BundleType::Formula, "fd", &["cat 1", "cat 1.2"]),
            entry(BundleType::Formula, "jq", &["cat 1"]),
            entry(BundleType::Formula, "bat", &["cat 2", "cat 1.2"]),
        ]
        .into();

        let text = serialize_manifest(&manifest);
        assert_eq!(
            text,
            "\
# cat 1
## cat 1.1
brew \"git\"
## cat 1.2
brew \"fd\"

# cat 1
brew \"jq\"

# cat 2
## cat 1.2
brew \"bat\"
"
        );
    }

    #[test]
    fn uncategorized_entries_go_first() {
        let manifest: Manifest = vec![
            entry(BundleType::Formula, "git", &["VCS"]),
            entry(BundleType::Cask, "vlc", &[]),
        ]
        .into();

        let text = serialize_manifest(&manifest);
        assert_eq!(text, "cask \"vlc\"\n\n# VCS\nbrew \"git\"\n");
    }

    #[test]
    fn others_are_written_verbatim() {
        let manifest: Manifest =
            vec![ManifestEntry::new(BundleType::StoreApp, "Xcode").with_others(["id: 497799835"])]
                .into();
        assert_eq!(serialize_manifest(&manifest), "mas \"Xcode\", id: 497799835\n");
    }

    #[test]
    fn round_trip_preserves_membership_and_categories() {
        let manifest: Manifest = vec![
            entry(BundleType::Cask, "vlc", &[]),
            entry(BundleType::Formula, "git", &["cat 1", "cat 1.1"]),
            entry(BundleType::Tap, "homebrew/bundle", &["cat 1", "cat 1.1", "deep"]),
            entry(BundleType::Formula, "jq", &["cat 1"]),
            entry(BundleType::StoreApp, "Xcode", &["cat 2"]).with_others(["id: 497799835"]),
            entry(BundleType::Formula, "bat", &["cat 2", "cat 1.1"]),
            entry(BundleType::Formula, "fd", &["cat 1", "cat 1.1"]),
        ]
        .into();

        let reparsed = parse_manifest(&serialize_manifest(&manifest));
        assert_eq!(reparsed.len(), manifest.len());
        for original in &manifest {
            let found = reparsed
                .get(original.bundle_type, &original.name)
                .unwrap_or_else(|| panic!("{} missing after round trip", original));
            assert_eq!(found.categories, original.categories, "{}", original);
            assert_eq!(found.others, original.others);
        }
    }

    #[test]
    fn serializing_is_stable() {
        let text = "# A\nbrew \"b\"\nbrew \"a\"\n## B\ncask \"c\"\n\n# C\ntap \"x/y\"\n";
        let once = serialize_manifest(&parse_manifest(text));
        let twice = serialize_manifest(&parse_manifest(&once));
        assert_eq!(once, twice);
    }
}
