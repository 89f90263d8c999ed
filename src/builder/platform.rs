//! Platform descriptor (DSC) generation.

use anyhow::Result;

use crate::builder::section::{render, SectionFormat};
use crate::builder::PUG_SIGNATURE;
use crate::core::descriptor::{ComponentConfig, PlatformConfig, NULL_LIBRARY, PLATFORM_OVERRIDES};
use crate::core::workspace::Workspace;
use crate::util::fs::write_lines;
use crate::util::shell::Shell;

const DEFINES: &str = "Defines";
const COMPONENTS: &str = "Components";

/// Render the platform descriptor.
///
/// `Defines` comes first, then the remaining platform sections in
/// declaration order, then `[Components]` listing every component with its
/// per-component overrides.
pub fn render_platform(platform: &PlatformConfig, components: &[ComponentConfig]) -> Vec<String> {
    let format = SectionFormat::default();
    let mut lines = render(Some(DEFINES), platform.sections.get(DEFINES), &format);

    for (name, section) in &platform.sections {
        if name == DEFINES || name == COMPONENTS {
            continue;
        }
        lines.extend(render(Some(name), Some(section), &format));
    }

    lines.extend(render(Some(COMPONENTS), None, &format));
    for component in components {
        lines.extend(render_component_entry(component));
    }
    lines
}

/// One `[Components]` entry, with an override block when the component
/// declares library class or fixed PCD settings.
fn render_component_entry(component: &ComponentConfig) -> Vec<String> {
    let mut lines = vec![format!("  {}", component.path.display())];
    let mut in_override = false;

    for kind in PLATFORM_OVERRIDES {
        let Some(section) = component.sections.get(*kind) else {
            continue;
        };
        if !in_override {
            if let Some(last) = lines.last_mut() {
                last.push_str(" {");
            }
            in_override = true;
        }
        lines.push(format!("    <{}>", kind));

        for row in section.rows() {
            let head = row.first().map(String::as_str).unwrap_or("");
            let tail = row.get(1).map(String::as_str).unwrap_or("");
            if head.is_empty() {
                continue;
            }
            if *kind == "LibraryClasses" && (head == NULL_LIBRARY || tail == NULL_LIBRARY) {
                continue;
            }
            lines.push(format!("      {} | {}", head, tail));
        }
    }

    if in_override {
        lines.push("  }".to_string());
    }
    lines
}

/// Write the platform descriptor.
///
/// The path is always reported; the file is only written when the
/// platform's `update` flag is set. Returns whether the file was written.
pub fn emit_platform(
    platform: &PlatformConfig,
    components: &[ComponentConfig],
    workspace: &Workspace,
    shell: &Shell,
) -> Result<bool> {
    let path = workspace.resolve(&platform.path);
    shell.say(format!("PLATFORM_DSC = {}", path.display()));
    if !platform.update {
        return Ok(false);
    }
    write_lines(&path, &render_platform(platform, components), Some(PUG_SIGNATURE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Section;
    use crate::test_support::{quiet_shell, workspace_at};
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn platform(update: bool) -> PlatformConfig {
        let mut sections = IndexMap::new();
        sections.insert(
            "Defines".to_string(),
            Section::mapping([("PLATFORM_NAME", "Hello"), ("DSC_SPECIFICATION", "0x0001001C")]),
        );
        PlatformConfig {
            path: "HelloPkg/HelloPkg.dsc".into(),
            update,
            sections,
        }
    }

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_without_overrides() {
        let comps = vec![ComponentConfig::new("HelloPkg/Hello/Hello.inf")];
        assert_eq!(
            render_platform(&platform(true), &comps),
            lines(&[
                "",
                "[Defines]",
                "  DSC_SPECIFICATION = 0x0001001C",
                "  PLATFORM_NAME = Hello",
                "",
                "[Components]",
                "  HelloPkg/Hello/Hello.inf",
            ])
        );
    }

    #[test]
    fn test_null_library_override_dropped() {
        let comp = ComponentConfig::new("App/App.inf").with_section(
            "LibraryClasses",
            Section::list([
                ["UefiLib", "MdePkg/Library/UefiLib/UefiLib.inf"],
                ["NULL", "Foo/FooLib.inf"],
                ["BarLib", "NULL"],
                ["", "Empty.inf"],
            ]),
        );
        let out = render_platform(&platform(true), &[comp]);
        let components: Vec<_> = out.iter().skip_while(|l| *l != "[Components]").cloned().collect();
        assert_eq!(
            components,
            lines(&[
                "[Components]",
                "  App/App.inf {",
                "    <LibraryClasses>",
                "      UefiLib | MdePkg/Library/UefiLib/UefiLib.inf",
                "  }",
            ])
        );
    }

    #[test]
    fn test_override_kinds_in_fixed_order() {
        let comp = ComponentConfig::new("App/App.inf")
            .with_section(
                "PcdsFixedAtBuild",
                Section::mapping([("gEfiMdePkgTokenSpaceGuid.PcdDebugPropertyMask", "0x2f")]),
            )
            .with_section("LibraryClasses", Section::list([["DebugLib", "Dbg.inf"]]));
        let out = render_platform(&platform(true), &[comp]);
        let tail = &out[out.len() - 6..];
        assert_eq!(
            tail,
            lines(&[
                "  App/App.inf {",
                "    <LibraryClasses>",
                "      DebugLib | Dbg.inf",
                "    <PcdsFixedAtBuild>",
                "      gEfiMdePkgTokenSpaceGuid.PcdDebugPropertyMask | 0x2f",
                "  }",
            ])
            .as_slice()
        );
    }

    #[test]
    fn test_extra_sections_in_declaration_order() {
        let mut p = platform(true);
        p.sections.insert("SkuIds".to_string(), Section::list([["0", "DEFAULT"]]));
        p.sections.insert("BuildOptions".to_string(), Section::list(["GCC:*_*_*_CC_FLAGS = -Wno-error"]));
        let out = render_platform(&p, &[]);
        let headers: Vec<_> = out.iter().filter(|l| l.starts_with('[')).cloned().collect();
        assert_eq!(headers, lines(&["[Defines]", "[SkuIds]", "[BuildOptions]", "[Components]"]));
    }

    #[test]
    fn test_emit_writes_banner_and_honors_update() {
        let tmp = TempDir::new().unwrap();
        let ws = workspace_at(tmp.path());
        let comps = vec![ComponentConfig::new("HelloPkg/Hello/Hello.inf")];
        let shell = quiet_shell();

        assert!(!emit_platform(&platform(false), &comps, &ws, &shell).unwrap());
        let path = tmp.path().join("HelloPkg").join("HelloPkg.dsc");
        assert!(!path.exists());

        assert!(emit_platform(&platform(true), &comps, &ws, &shell).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(PUG_SIGNATURE));
        assert!(content.ends_with("  HelloPkg/Hello/Hello.inf\n"));

        assert!(!emit_platform(&platform(true), &comps, &ws, &shell).unwrap());
    }
}
