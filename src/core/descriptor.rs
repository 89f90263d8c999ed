//! Platform (DSC) and component (INF) descriptor data.
//!
//! Descriptors are declared in `Pug.toml` as plain tables. Every key other
//! than `path` and `update` is a section, e.g.
//!
//! ```toml
//! [[component]]
//! path = "MyDriver/MyDriver.inf"
//! update = true
//! Sources = ["MyDriver.c"]
//! LibraryClasses = [["UefiDriverEntryPoint", "MdePkg/Library/UefiDriverEntryPoint/UefiDriverEntryPoint.inf"]]
//!
//! [component.Defines]
//! INF_VERSION = "0x00010005"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section names recognized in a component descriptor.
pub const COMPONENT_SECTIONS: &[&str] = &[
    "Sources",
    "Packages",
    "LibraryClasses",
    "Protocols",
    "Ppis",
    "Guids",
    "FeaturePcd",
    "Pcd",
    "BuildOptions",
    "Depex",
    "UserExtensions",
];

/// Component sections that are also emitted as overrides in the platform's
/// `[Components]` block.
pub const PLATFORM_OVERRIDES: &[&str] = &["LibraryClasses", "PcdsFixedAtBuild"];

/// Library class name that never appears in generated descriptors.
pub const NULL_LIBRARY: &str = "NULL";

/// A scalar value of a mapping section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Boolean(true) => f.write_str("TRUE"),
            Scalar::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

/// One element of a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// A plain line, e.g. `MyDriver.c`
    Item(String),
    /// Parts joined with the section separator, e.g. `["Class", "Path.inf"]`
    Parts(Vec<String>),
}

impl Entry {
    /// Whether the entry renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Entry::Item(s) => s.is_empty(),
            Entry::Parts(parts) => parts.is_empty(),
        }
    }

    /// Render the entry, joining parts with `sep`.
    pub fn join(&self, sep: &str) -> String {
        match self {
            Entry::Item(s) => s.clone(),
            Entry::Parts(parts) => parts.join(sep),
        }
    }
}

impl From<&str> for Entry {
    fn from(s: &str) -> Self {
        Entry::Item(s.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for Entry {
    fn from(parts: [&str; N]) -> Self {
        Entry::Parts(parts.iter().map(|s| s.to_string()).collect())
    }
}

/// Payload of a descriptor section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    /// Ordered lines
    List(Vec<Entry>),
    /// Unordered lines, rendered sorted
    Set(BTreeSet<String>),
    /// `key = value` lines, rendered sorted by key
    Mapping(BTreeMap<String, Scalar>),
}

impl Section {
    /// Build a list section.
    pub fn list<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        Section::List(entries.into_iter().map(Into::into).collect())
    }

    /// Build a mapping section.
    pub fn mapping<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Section::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether the section has no payload at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Section::List(v) => v.is_empty(),
            Section::Set(s) => s.is_empty(),
            Section::Mapping(m) => m.is_empty(),
        }
    }

    /// Flatten the payload into rows of fields, in render order.
    ///
    /// Mapping rows are `[key, value]`.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Section::List(entries) => entries
                .iter()
                .map(|e| match e {
                    Entry::Item(s) => vec![s.clone()],
                    Entry::Parts(parts) => parts.clone(),
                })
                .collect(),
            Section::Set(items) => items.iter().map(|s| vec![s.clone()]).collect(),
            Section::Mapping(map) => map
                .iter()
                .map(|(k, v)| vec![k.clone(), v.to_string()])
                .collect(),
        }
    }
}

/// The platform descriptor (DSC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Descriptor path, relative to the workspace
    pub path: PathBuf,

    /// Regenerate the file; when false the file on disk is left untouched
    #[serde(default)]
    pub update: bool,

    /// `Defines` and any other platform-level sections, in declaration order
    #[serde(flatten)]
    pub sections: IndexMap<String, Section>,
}

/// A component descriptor (INF).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Descriptor path, relative to the workspace
    pub path: PathBuf,

    /// Regenerate the file; when false the file on disk is left untouched
    #[serde(default)]
    pub update: bool,

    /// Sections in declaration order; names may carry a `.ARCH` qualifier
    #[serde(flatten)]
    pub sections: IndexMap<String, Section>,
}

impl ComponentConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ComponentConfig {
            path: path.into(),
            update: true,
            sections: IndexMap::new(),
        }
    }

    /// Add or replace a section.
    pub fn with_section(mut self, name: impl Into<String>, section: Section) -> Self {
        self.sections.insert(name.into(), section);
        self
    }

    /// The mandatory `Defines` section, if declared and non-empty.
    pub fn defines(&self) -> Option<&Section> {
        self.sections.get("Defines").filter(|s| !s.is_empty())
    }
}

/// Strip a `.ARCH` style qualifier from a section name.
pub fn base_section_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_section_name() {
        assert_eq!(base_section_name("Sources"), "Sources");
        assert_eq!(base_section_name("Sources.X64"), "Sources");
        assert_eq!(base_section_name("BuildOptions.common.DXE"), "BuildOptions");
    }

    #[test]
    fn test_component_from_toml_preserves_section_order() {
        let comp: ComponentConfig = toml::from_str(
            r#"
path = "MyDriver/MyDriver.inf"
update = true
Sources = ["MyDriver.c", "Helper.c"]
Packages = ["MdePkg/MdePkg.dec"]
LibraryClasses = [["UefiLib", "MdePkg/Library/UefiLib/UefiLib.inf"], ["NULL", "x.inf"]]

[Defines]
INF_VERSION = "0x00010005"
BASE_NAME = "MyDriver"
"#,
        )
        .unwrap();

        assert!(comp.update);
        let names: Vec<_> = comp.sections.keys().cloned().collect();
        assert_eq!(names, vec!["Sources", "Packages", "LibraryClasses", "Defines"]);
        assert!(comp.defines().is_some());
        assert_eq!(
            comp.sections["LibraryClasses"],
            Section::list([
                ["UefiLib", "MdePkg/Library/UefiLib/UefiLib.inf"],
                ["NULL", "x.inf"]
            ])
        );
    }

    #[test]
    fn test_mapping_scalars() {
        let comp: ComponentConfig = toml::from_str(
            r#"
path = "a.inf"
[Defines]
VERSION_STRING = 1.5
MODULE_UNI = true
COUNT = 3
"#,
        )
        .unwrap();
        let Section::Mapping(defines) = &comp.sections["Defines"] else {
            panic!("expected a mapping");
        };
        assert_eq!(defines["VERSION_STRING"].to_string(), "1.5");
        assert_eq!(defines["MODULE_UNI"].to_string(), "TRUE");
        assert_eq!(defines["COUNT"].to_string(), "3");
        assert!(!comp.update);
    }

    #[test]
    fn test_rows() {
        let section = Section::mapping([("B", "2"), ("A", "1")]);
        assert_eq!(
            section.rows(),
            vec![vec!["A".to_string(), "1".to_string()], vec!["B".to_string(), "2".to_string()]]
        );
    }

    #[test]
    fn test_empty_defines_is_missing() {
        let comp = ComponentConfig::new("a.inf").with_section("Defines", Section::list::<_, Entry>([]));
        assert!(comp.defines().is_none());
    }
}
