//! Descriptor section rendering.
//!
//! A section renders as a blank line, a `[Name]` header and one body line per
//! payload element. Headers are indented two spaces per level and the body
//! one level deeper.

use crate::core::descriptor::{Entry, Section};

/// Layout options of a rendered section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionFormat<'a> {
    /// Joins the parts of a list entry, and keys with values of a mapping
    pub separator: &'a str,

    /// Indentation level of the header
    pub indent: usize,

    /// Render a mapping as its keys only, one per line
    pub as_list: bool,
}

impl Default for SectionFormat<'_> {
    fn default() -> Self {
        SectionFormat {
            separator: "=",
            indent: 0,
            as_list: false,
        }
    }
}

impl<'a> SectionFormat<'a> {
    pub fn separator(mut self, separator: &'a str) -> Self {
        self.separator = separator;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn as_list(mut self) -> Self {
        self.as_list = true;
        self
    }
}

fn pad(level: usize) -> String {
    " ".repeat(level * 2)
}

/// Render a section.
///
/// The header is emitted whenever `name` is given, even for an empty or
/// missing payload. Empty elements and empty mapping keys render nothing.
pub fn render(name: Option<&str>, payload: Option<&Section>, format: &SectionFormat<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(name) = name {
        lines.push(String::new());
        lines.push(format!("{}[{}]", pad(format.indent), name));
    }

    let Some(payload) = payload else {
        return lines;
    };
    let body = pad(format.indent + 1);
    let sep = format.separator;

    match payload {
        Section::List(entries) => lines.extend(
            entries
                .iter()
                .filter(|e| !e.is_empty())
                .map(|e| format!("{}{}", body, e.join(sep))),
        ),
        Section::Set(items) => lines.extend(
            items
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| format!("{}{}", body, s)),
        ),
        Section::Mapping(map) if format.as_list => lines.extend(
            map.keys()
                .filter(|k| !k.is_empty())
                .map(|k| format!("{}{}", body, k)),
        ),
        Section::Mapping(map) => lines.extend(
            map.iter()
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, v)| format!("{}{} {} {}", body, k, sep, v)),
        ),
    }
    lines
}

/// Render a list of plain lines under `name`.
pub fn render_list<S: AsRef<str>>(name: &str, items: &[S], format: &SectionFormat<'_>) -> Vec<String> {
    let section = Section::List(
        items
            .iter()
            .map(|s| Entry::Item(s.as_ref().to_string()))
            .collect(),
    );
    render(Some(name), Some(&section), format)
}
