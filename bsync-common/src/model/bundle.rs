// bsync-common/src/model/bundle.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of installable unit in a Brewfile.
///
/// Declaration order is significant: it is the install order and the sort
/// order of entries inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Tap,
    Formula,
    Cask,
    /// Mac App Store app, identified by its numeric store id.
    StoreApp,
}

impl BundleType {
    /// The Brewfile keyword for this type.
    pub fn token(&self) -> &'static str {
        match self {
            BundleType::Tap => "tap",
            BundleType::Formula => "brew",
            BundleType::Cask => "cask",
            BundleType::StoreApp => "mas",
        }
    }

    /// Maps a Brewfile keyword to a type. Unknown keywords are treated as
    /// formulae, the same way `brew` treats a bare package name.
    pub fn from_token(token: &str) -> Self {
        Self::parse_token(token).unwrap_or(BundleType::Formula)
    }

    /// Strict variant of [`BundleType::from_token`].
    pub fn parse_token(token: &str) -> Option<Self> {
        match token {
            "tap" => Some(BundleType::Tap),
            "brew" => Some(BundleType::Formula),
            "cask" => Some(BundleType::Cask),
            "mas" => Some(BundleType::StoreApp),
            _ => None,
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One declared or installed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Extra clauses after the name, kept verbatim (`id: 497799835`, `args: [...]`).
    pub others: Vec<String>,
    pub bundle_type: BundleType,
    /// Heading path the entry sits under, outermost first.
    pub categories: Vec<String>,
}

impl ManifestEntry {
    pub fn new(bundle_type: BundleType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            others: Vec::new(),
            bundle_type,
            categories: Vec::new(),
        }
    }

    pub fn with_others<I, S>(mut self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.others = others.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Identity of the entry within a manifest.
    pub fn key(&self) -> (BundleType, &str) {
        (self.bundle_type, self.name.as_str())
    }

    pub fn depth(&self) -> usize {
        self.categories.len()
    }

    /// The numeric App Store id carried by `mas` entries (`id: 123`).
    pub fn store_id(&self) -> Option<u64> {
        self.others.iter().find_map(|clause| {
            let (key, value) = clause.split_once(':')?;
            if key.trim() == "id" {
                value.trim().parse().ok()
            } else {
                None
            }
        })
    }

    /// Renders the entry as a Brewfile line: `<type> "<name>"[, <other>...]`.
    pub fn to_line(&self) -> String {
        let mut line = format!("{} \"{}\"", self.bundle_type.token(), self.name);
        for other in &self.others {
            line.push_str(", ");
            line.push_str(other);
        }
        line
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
