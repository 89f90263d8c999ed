//! `Conf/target.txt` emission.

use anyhow::Result;

use crate::core::target_config::TargetConfig;
use crate::util::fs::write_lines;

/// Render the emitted entries as `KEY = VALUE` lines.
pub fn render_target_txt(config: &TargetConfig) -> Vec<String> {
    config
        .emitted()
        .map(|(k, v)| format!("{} = {}", k, v))
        .collect()
}

/// Write `target.txt` unless its `update` flag is off.
///
/// Returns whether the file was written.
pub fn emit_target_txt(config: &TargetConfig) -> Result<bool> {
    if !config.update {
        tracing::debug!("leaving {} untouched", config.path.display());
        return Ok(false);
    }
    write_lines(&config.path, &render_target_txt(config), None)
}
