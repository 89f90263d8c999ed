//! `Conf/target.txt` settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// Key naming the platform descriptor the external build uses by default.
pub const ACTIVE_PLATFORM: &str = "ACTIVE_PLATFORM";

/// Flat `KEY = VALUE` configuration consumed by the external build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetConfig {
    /// Output file (absolute)
    pub path: PathBuf,

    /// Regenerate the file
    pub update: bool,

    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

impl TargetConfig {
    /// Entries that end up in the file: upper-case keys, sorted.
    pub fn emitted(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| is_upper_key(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A key is upper-case when it has at least one cased character and no
/// lower-case ones (`TOOL_CHAIN_TAG` yes, `path` and `_1` no).
pub fn is_upper_key(key: &str) -> bool {
    key.chars().any(char::is_uppercase) && !key.chars().any(char::is_lowercase)
}
