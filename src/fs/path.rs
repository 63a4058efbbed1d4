//! conversion between on-disk paths and manifest names

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::manifest::ORIGIN_MARKER;

/// manifest name for `path` relative to `root`: components joined with `/`
///
/// returns None when `path` is outside `root`, equals `root`, contains
/// components that are not valid UTF-8 or a line terminator, or starts with
/// the origin marker. such names cannot be written to a manifest.
pub fn manifest_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    let name = parts.join("/");
    if name.contains(['\n', '\r']) || name.starts_with(ORIGIN_MARKER) {
        return None;
    }
    Some(name)
}

/// reject manifest names that are absolute or climb out of their root
pub fn check_name(name: &str) -> Result<()> {
    let unsafe_name = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|part| part == "..")
        || name.split('/').all(|part| part.is_empty() || part == ".");
    if unsafe_name {
        return Err(Error::UnsafePath(name.to_string()));
    }
    Ok(())
}

/// join a manifest name onto `root`, rejecting names that would escape it
pub fn safe_join(root: &Path, name: &str) -> Result<PathBuf> {
    check_name(name)?;

    let mut path = root.to_path_buf();
    for part in name.split('/') {
        if !part.is_empty() && part != "." {
            path.push(part);
        }
    }

    // a name like "c:foo" is a prefix component on windows
    if !path.starts_with(root) || path == root {
        return Err(Error::UnsafePath(name.to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_name_nested() {
        let root = Path::new("/data/tree");
        assert_eq!(
            manifest_name(root, Path::new("/data/tree/a/b/c.txt")).as_deref(),
            Some("a/b/c.txt")
        );
        assert_eq!(
            manifest_name(root, Path::new("/data/tree/top")).as_deref(),
            Some("top")
        );
    }

    #[test]
    fn test_manifest_name_rejects_root_and_outside() {
        let root = Path::new("/data/tree");
        assert!(manifest_name(root, root).is_none());
        assert!(manifest_name(root, Path::new("/data/other/file")).is_none());
    }

    #[test]
    fn test_manifest_name_rejects_newline() {
        let root = Path::new("/data/tree");
        assert!(manifest_name(root, Path::new("/data/tree/bad\nname")).is_none());
    }

    #[test]
    fn test_manifest_name_rejects_origin_marker() {
        let root = Path::new("/data/tree");
        assert!(manifest_name(root, Path::new("/data/tree/#@notes.txt")).is_none());
        assert_eq!(
            manifest_name(root, Path::new("/data/tree/dir/#@notes.txt")).as_deref(),
            Some("dir/#@notes.txt")
        );
        assert_eq!(
            manifest_name(root, Path::new("/data/tree/#notes.txt")).as_deref(),
            Some("#notes.txt")
        );
    }

    #[test]
    fn test_manifest_name_keeps_padding() {
        let root = Path::new("/data/tree");
        assert_eq!(
            manifest_name(root, Path::new("/data/tree/ pad.txt ")).as_deref(),
            Some(" pad.txt ")
        );
    }

    #[test]
    fn test_safe_join_accepts_relative() {
        let root = Path::new("/data/tree");
        assert_eq!(
            safe_join(root, "a/b.txt").unwrap(),
            PathBuf::from("/data/tree/a/b.txt")
        );
        assert_eq!(
            safe_join(root, "./a//b.txt").unwrap(),
            PathBuf::from("/data/tree/a/b.txt")
        );
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("a/b.txt").is_ok());
        assert!(check_name(".patch").is_ok());
        assert!(check_name("..hidden").is_ok());
        assert!(check_name("a/../b").is_err());
        assert!(check_name("./.").is_err());
    }

    #[test]
    fn test_safe_join_rejects_escape() {
        let root = Path::new("/data/tree");
        for name in ["../etc/passwd", "a/../../x", "/etc/passwd", "", ".", "a\\b"] {
            assert!(
                matches!(safe_join(root, name), Err(Error::UnsafePath(_))),
                "accepted {:?}",
                name
            );
        }
    }
}
