// bsync-core/src/manifest/parse.rs
use bsync_common::model::{BundleType, Manifest, ManifestEntry};
use tracing::{debug, trace};

pub(crate) const HEADING_MARKER: char = '#';

enum Line<'a> {
    Heading { depth: usize, title: &'a str },
    Entry(ManifestEntry),
    Skip,
}

/// Parses Brewfile text.
///
/// Headings (`#`, `##`, ...) build up a category path; every entry line gets
/// a copy of the path that is current when it is read. Blank lines and lines
/// that are neither a heading nor an entry are skipped.
pub fn parse_manifest(text: &str) -> Manifest {
    let mut stack: Vec<String> = Vec::new();
    let mut manifest = Manifest::new();

    for (lineno, raw) in text.lines().enumerate() {
        match classify(raw) {
            Line::Heading { depth, title } => {
                stack.truncate(depth - 1);
                stack.push(title.to_string());
            }
            Line::Entry(mut entry) => {
                entry.categories = stack.clone();
                manifest.push(entry);
            }
            Line::Skip => {
                if !raw.trim().is_empty() {
                    debug!("Skipping unrecognized Brewfile line {}: {:?}", lineno + 1, raw);
                }
            }
        }
    }

    manifest
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Skip;
    }
    let trimmed = line.trim_start();
    if trimmed.starts_with(HEADING_MARKER) {
        return parse_heading(trimmed).map_or(Line::Skip, |(depth, title)| Line::Heading {
            depth,
            title,
        });
    }
    parse_entry(line).map_or(Line::Skip, Line::Entry)
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let depth = line.chars().take_while(|c| *c == HEADING_MARKER).count();
    let rest = &line[depth..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((depth, title))
}

fn parse_entry(line: &str) -> Option<ManifestEntry> {
    let line = line.trim();
    let (token, rest) = line.split_once(' ')?;

    let mut clauses = rest.split(',');
    let name = clauses
        .next()
        .map(|n| n.trim().trim_matches('"').trim())
        .filter(|n| !n.is_empty())?;
    let others: Vec<String> = clauses.map(|c| c.trim().to_string()).collect();

    let bundle_type = BundleType::parse_token(token).unwrap_or_else(|| {
        trace!("Unknown Brewfile keyword '{}', treating '{}' as a formula", token, name);
        BundleType::Formula
    });

    Some(ManifestEntry {
        name: name.to_string(),
        others,
        bundle_type,
        categories: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(entry: &ManifestEntry) -> Vec<&str> {
        entry.categories.iter().map(String::as_str).collect()
    }

    #[test]
    fn headings_build_a_category_path() {
        let text = "\
# Tools
brew \"jq\"
## CLI
### Search
brew \"ripgrep\"
## Editors
cask \"zed\"
# Media
cask \"vlc\"
";
        let manifest = parse_manifest(text);
        let entries = manifest.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(cats(&entries[0]), vec!["Tools"]);
        assert_eq!(cats(&entries[1]), vec!["Tools", "CLI", "Search"]);
        assert_eq!(cats(&entries[2]), vec!["Tools", "Editors"]);
        assert_eq!(cats(&entries[3]), vec!["Media"]);
    }

    #[test]
    fn entries_before_any_heading_have_no_category() {
        let manifest = parse_manifest("tap \"homebrew/bundle\"\n# Later\nbrew \"git\"\n");
        assert!(manifest.entries()[0].categories.is_empty());
        assert_eq!(manifest.entries()[0].bundle_type, BundleType::Tap);
        assert_eq!(cats(&manifest.entries()[1]), vec!["Later"]);
    }

    #[test]
    fn entry_clauses_are_split_and_trimmed() {
        let manifest = parse_manifest("mas \"Xcode\", id: 497799835\nbrew \"postgresql@16\", restart_service: :changed, link: true\n");
        let xcode = &manifest.entries()[0];
        assert_eq!(xcode.name, "Xcode");
        assert_eq!(xcode.bundle_type, BundleType::StoreApp);
        assert_eq!(xcode.others, vec!["id: 497799835".to_string()]);
        assert_eq!(xcode.store_id(), Some(497799835));

        let pg = &manifest.entries()[1];
        assert_eq!(pg.name, "postgresql@16");
        assert_eq!(
            pg.others,
            vec!["restart_service: :changed".to_string(), "link: true".to_string()]
        );
    }

    #[test]
    fn unknown_keywords_become_formulae() {
        let manifest = parse_manifest("whalebrew \"whalebrew/wget\"\n");
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries()[0].bundle_type, BundleType::Formula);
        assert_eq!(manifest.entries()[0].name, "whalebrew/wget");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "\n#\n#nospace\nbrew\nbrew \"\"\n   \nbrew \"git\"\n";
        let manifest = parse_manifest(text);
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries()[0].name, "git");
        assert!(manifest.entries()[0].categories.is_empty());
    }

    #[test]
    fn shallower_heading_pops_the_stack() {
        let text = "# a\n## b\n### c\nbrew \"x\"\n## d\nbrew \"y\"\n### e\n# f\nbrew \"z\"\n";
        let manifest = parse_manifest(text);
        assert_eq!(cats(&manifest.entries()[0]), vec!["a", "b", "c"]);
        assert_eq!(cats(&manifest.entries()[1]), vec!["a", "d"]);
        assert_eq!(cats(&manifest.entries()[2]), vec!["f"]);
    }

    #[test]
    fn heading_depth_matches_marker_count() {
        let manifest = parse_manifest("# one\n## two\nbrew \"a\"\nbrew \"b\"\n### three\nbrew \"c\"\n");
        let depths: Vec<usize> = manifest.iter().map(ManifestEntry::depth).collect();
        assert_eq!(depths, vec![2, 2, 3]);
    }
}
