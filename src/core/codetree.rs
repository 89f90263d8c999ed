//! Code tree - remote repositories kept at declared revisions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Reserved name of the primary SDK source tree.
pub const PRIMARY_TREE: &str = "edk2";

/// Revision used when an entry declares none.
pub const DEFAULT_SIGNATURE: &str = "master";

/// Where a code-tree entry comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    /// Clone URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Tag, branch or commit to check out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// A single repository of the code tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTreeEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSpec>,

    /// Local working copy (absolute)
    pub path: PathBuf,

    /// Update submodules after checkout
    pub recursive: bool,

    /// Contribute `path` to `PACKAGES_PATH`
    pub multiworkspace: bool,

    /// Shell command applied after checkout, run from the workspace root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl CodeTreeEntry {
    /// Create an entry with no source, living at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CodeTreeEntry {
            source: None,
            path: path.into(),
            recursive: false,
            multiworkspace: false,
            patch: None,
        }
    }

    /// Set the clone URL and revision.
    pub fn with_source(mut self, url: impl Into<String>, signature: impl Into<String>) -> Self {
        self.source = Some(SourceSpec {
            url: Some(url.into()),
            signature: Some(signature.into()),
        });
        self
    }

    /// Clone URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.url.as_deref())
    }

    /// Revision to check out; `master` when unspecified or empty.
    pub fn signature(&self) -> &str {
        self.source
            .as_ref()
            .and_then(|s| s.signature.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SIGNATURE)
    }
}

/// All code-tree entries, keyed by name.
///
/// Iteration order of the secondary entries is the sorted order of their
/// names, so repeated runs process them identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeTree {
    entries: BTreeMap<String, CodeTreeEntry>,
}

impl CodeTree {
    pub fn new() -> Self {
        CodeTree::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: CodeTreeEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&CodeTreeEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CodeTreeEntry> {
        self.entries.get_mut(name)
    }

    /// The primary SDK entry.
    pub fn primary(&self) -> Option<&CodeTreeEntry> {
        self.entries.get(PRIMARY_TREE)
    }

    /// Every entry other than the primary, in stable order.
    pub fn secondaries(&self) -> impl Iterator<Item = (&str, &CodeTreeEntry)> {
        self.entries
            .iter()
            .filter(|(name, _)| name.as_str() != PRIMARY_TREE)
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// All entries, in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeTreeEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
