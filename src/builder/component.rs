//! Component descriptor (INF) generation.

use std::path::Path;

use anyhow::Result;

use crate::builder::section::{render, render_list, SectionFormat};
use crate::builder::PUG_SIGNATURE;
use crate::core::descriptor::{base_section_name, ComponentConfig, COMPONENT_SECTIONS, NULL_LIBRARY};
use crate::core::error::ConfigError;
use crate::core::workspace::Workspace;
use crate::util::fs::write_lines;
use crate::util::shell::Shell;

/// Render a component descriptor.
///
/// `Defines` is mandatory and comes first; recognized sections follow in
/// declaration order. `LibraryClasses` lists class names only, without the
/// `NULL` class. `path` only labels the error.
pub fn render_component(component: &ComponentConfig, path: &Path) -> Result<Vec<String>, ConfigError> {
    let defines = component
        .defines()
        .ok_or_else(|| ConfigError::MissingDefines {
            path: path.to_path_buf(),
        })?;

    let format = SectionFormat::default();
    let mut lines = render(Some("Defines"), Some(defines), &format);

    for (name, section) in &component.sections {
        let base = base_section_name(name);
        if !COMPONENT_SECTIONS.contains(&base) {
            continue;
        }
        if base == "LibraryClasses" {
            let classes: Vec<String> = section
                .rows()
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .filter(|class| class != NULL_LIBRARY)
                .collect();
            lines.extend(render_list(name, &classes, &format));
        } else {
            lines.extend(render(Some(name), Some(section), &format));
        }
    }
    Ok(lines)
}

/// Write every component descriptor whose `update` flag is set.
///
/// Each path is reported, written or not. Returns the number of files
/// written.
pub fn emit_components(components: &[ComponentConfig], workspace: &Workspace, shell: &Shell) -> Result<usize> {
    let mut written = 0;
    for component in components {
        let path = workspace.resolve(&component.path);
        shell.say(format!("COMPONENT: {}", path.display()));
        if !component.update {
            continue;
        }
        let lines = render_component(component, &path)?;
        if write_lines(&path, &lines, Some(PUG_SIGNATURE))? {
            written += 1;
        }
    }
    Ok(written)
}
