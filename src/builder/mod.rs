//! Generated build inputs.
//!
//! Everything pug writes for the SDK lives here: descriptor sections, the
//! platform and component descriptors, `target.txt`, the configuration
//! templates, and the BaseTools helpers build.

pub mod basetools;
pub mod component;
pub mod platform;
pub mod section;
pub mod target_txt;

pub use basetools::{build_basetools, copy_conf_files};
pub use component::{emit_components, render_component};
pub use platform::{emit_platform, render_platform};
pub use section::{render, SectionFormat};
pub use target_txt::emit_target_txt;

/// Banner heading every generated descriptor.
pub const PUG_SIGNATURE: &str = "#\n# Do not edit this file.\n# It is automatically created by PUG.\n#\n";
