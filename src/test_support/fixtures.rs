//! Test fixtures for common test scenarios.

use std::path::Path;

use crate::core::workspace::Workspace;
use crate::util::shell::{ColorChoice, Shell, Verbosity};

/// A small project: one platform, one application component, one extra
/// code tree.
pub const HELLO_PROJECT: &str = r#"
[workspace]
target = "DEBUG"

[codetree.edk2-libc]
multiworkspace = true
source = { url = "https://github.com/tianocore/edk2-libc.git" }

[platform]
path = "HelloPkg/HelloPkg.dsc"
update = true

[platform.Defines]
PLATFORM_NAME = "HelloPkg"
PLATFORM_GUID = "2c5b1a33-a8a6-4e1c-9cb2-4f4a3a3c5a01"
PLATFORM_VERSION = "0.1"
DSC_SPECIFICATION = "0x00010005"
SUPPORTED_ARCHITECTURES = "X64"
BUILD_TARGETS = "DEBUG|RELEASE"
SKUID_IDENTIFIER = "DEFAULT"

[[component]]
path = "HelloPkg/Hello/Hello.inf"
update = true
Sources = ["Hello.c"]
Packages = ["MdePkg/MdePkg.dec"]
LibraryClasses = [
    ["UefiApplicationEntryPoint", "MdePkg/Library/UefiApplicationEntryPoint/UefiApplicationEntryPoint.inf"],
    ["UefiLib", "MdePkg/Library/UefiLib/UefiLib.inf"],
]

[component.Defines]
INF_VERSION = "0x00010005"
BASE_NAME = "Hello"
FILE_GUID = "6987936e-ed34-44db-ae97-1fa5e4ed2116"
MODULE_TYPE = "UEFI_APPLICATION"
VERSION_STRING = "1.0"
ENTRY_POINT = "UefiMain"
"#;

/// A workspace rooted at `root` with its configuration in `root/Conf`.
pub fn workspace_at(root: &Path) -> Workspace {
    Workspace {
        path: root.to_path_buf(),
        target: "RELEASE".to_string(),
        target_arch: "X64".to_string(),
        tool_chain_tag: "GCC5".to_string(),
        conf_path: root.join("Conf"),
    }
}

/// A shell that prints errors only.
pub fn quiet_shell() -> Shell {
    Shell::new(Verbosity::Quiet, ColorChoice::Never)
}

/// Lay out the part of an SDK checkout the pipeline touches: the
/// configuration templates and a `.git` marker.
pub fn fake_sdk(root: &Path) {
    let conf = root.join("BaseTools").join("Conf");
    std::fs::create_dir_all(&conf).ok();
    std::fs::create_dir_all(root.join(".git")).ok();
    for name in ["build_rule", "tools_def", "target"] {
        std::fs::write(conf.join(format!("{}.template", name)), format!("# {}\n", name)).ok();
    }
}
