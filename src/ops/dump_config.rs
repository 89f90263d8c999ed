//! `--dump-default-config`: print the effective configuration.

use anyhow::{Context, Result};

use crate::util::config::Config;

/// Printed for a scope that is absent or has no content.
pub const EMPTY_SCOPE: &str = "(empty)";

fn is_empty(value: &toml::Value) -> bool {
    match value {
        toml::Value::String(s) => s.is_empty(),
        toml::Value::Array(a) => a.is_empty(),
        toml::Value::Table(t) => t.is_empty(),
        _ => false,
    }
}

/// Render the configuration, or one scope of it, as TOML.
///
/// A scope is a dotted path into the configuration, e.g. `workspace` or
/// `codetree.edk2`.
pub fn dump_config(config: &Config, scope: Option<&str>) -> Result<String> {
    let root = toml::Value::try_from(config).context("failed to serialize configuration")?;

    let Some(scope) = scope.filter(|s| !s.is_empty()) else {
        return toml::to_string_pretty(&root).context("failed to serialize configuration");
    };

    let mut value = &root;
    for key in scope.split('.') {
        match value.get(key) {
            Some(v) => value = v,
            None => return Ok(EMPTY_SCOPE.to_string()),
        }
    }

    if is_empty(value) {
        return Ok(EMPTY_SCOPE.to_string());
    }
    match value {
        toml::Value::Table(_) => toml::to_string_pretty(value).context("failed to serialize configuration"),
        toml::Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::Defaults;
    use crate::util::context::Host;
    use std::path::Path;

    fn config() -> Config {
        let defaults = Defaults::from_lookup(Path::new("/ws"), |k| match k {
            "UDK_DIR" => Some("/sdk".to_string()),
            _ => None,
        });
        Config::from_defaults(defaults, Path::new("/ws"), Host::Linux)
    }

    #[test]
    fn test_dump_everything() {
        let out = dump_config(&config(), None).unwrap();
        assert!(out.contains("[workspace]"));
        assert!(out.contains("tool_chain_tag = \"GCC5\""));
        assert!(out.contains("[codetree.edk2]"));
        assert!(out.contains("TOOL_CHAIN_CONF = \"tools_def.txt\""));
    }

    #[test]
    fn test_dump_scope() {
        let out = dump_config(&config(), Some("workspace")).unwrap();
        assert!(out.contains("target = \"RELEASE\""));
        assert!(!out.contains("[codetree"));

        assert_eq!(dump_config(&config(), Some("workspace.target_arch")).unwrap(), "X64");
        assert_eq!(dump_config(&config(), Some("codetree.edk2.recursive")).unwrap(), "true");
    }

    #[test]
    fn test_dump_missing_or_empty_scope() {
        assert_eq!(dump_config(&config(), Some("nope")).unwrap(), EMPTY_SCOPE);
        assert_eq!(dump_config(&config(), Some("platform")).unwrap(), EMPTY_SCOPE);
        assert_eq!(dump_config(&config(), Some("target_txt.ACTIVE_PLATFORM")).unwrap(), EMPTY_SCOPE);
    }
}
