//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve `path` against `base` unless it is already absolute.
pub fn abs_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Join lines into file content, always ending with a newline.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut content = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

/// Write generated content, prefixed by an optional signature banner.
///
/// Parent directories are created first. When the file already holds exactly
/// the new content the write is skipped, so the file's modification time
/// does not trigger a rebuild downstream.
///
/// Returns whether the file was written.
pub fn write_file(path: &Path, content: &str, signature: Option<&str>) -> Result<bool> {
    let content = match signature {
        Some(sig) => format!("{}{}", sig, content),
        None => content.to_string(),
    };

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    if path.is_file() {
        let current = fs::read(path)
            .with_context(|| format!("failed to read file: {}", path.display()))?;
        if current == content.as_bytes() {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(false);
        }
    }

    fs::write(path, content)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(true)
}

/// Write generated lines; see [`write_file`].
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S], signature: Option<&str>) -> Result<bool> {
    write_file(path, &join_lines(lines), signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_join_lines_trailing_newline() {
        assert_eq!(join_lines(&["a", "b"]), "a\nb\n");
        assert_eq!(join_lines(&["a\n"]), "a\n");
        assert_eq!(join_lines::<&str>(&[]), "\n");
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("x.dsc");

        assert!(write_file(&path, "hello\n", None).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_file_skips_identical_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.inf");

        assert!(write_file(&path, "body\n", Some("#sig\n")).unwrap());
        assert!(!write_file(&path, "body\n", Some("#sig\n")).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "#sig\nbody\n");
    }

    #[test]
    fn test_write_file_overwrites_different_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.inf");

        assert!(write_file(&path, "one\n", None).unwrap());
        assert!(write_file(&path, "two\n", None).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");

        // Same body, different banner, is different content.
        assert!(write_file(&path, "two\n", Some("#\n")).unwrap());
    }

    #[test]
    fn test_write_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("target.txt");
        write_lines(&path, &["A = 1", "B = 2"], None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A = 1\nB = 2\n");
    }

    #[test]
    fn test_abs_path() {
        let base = Path::new("/base");
        assert_eq!(abs_path(Path::new("x/y"), base), PathBuf::from("/base/x/y"));
    }
}
