//! directory hashing
//!
//! walks a tree and produces one [`HashItem`] per regular file, either one
//! file at a time or through the worker pool.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::fs::manifest_name;
use crate::hash::digest_file;
use crate::manifest::{HashItem, MANIFEST_FILE};
use crate::pool::{self, Concurrency, ErrorPolicy};

/// how to hash a tree
#[derive(Clone, Copy, Debug, Default)]
pub struct HashOptions {
    pub concurrency: Concurrency,
    pub on_error: ErrorPolicy,
}

/// hash every regular file under `root`
///
/// names are root-relative with `/` separators and come out in walk order.
/// a traversal failure is always fatal; a file that cannot be read is
/// skipped or fails the call depending on `options.on_error`.
pub fn hash_tree(root: &Path, options: &HashOptions) -> Result<Vec<HashItem>> {
    let items = if options.concurrency.is_pooled() {
        hash_pooled(root, options.concurrency.effective(), options.on_error)?
    } else {
        hash_sequential(root, options.on_error)?
    };
    tracing::info!(root = %root.display(), files = items.len(), "hashed tree");
    Ok(items)
}

fn hash_sequential(root: &Path, on_error: ErrorPolicy) -> Result<Vec<HashItem>> {
    let mut items = Vec::new();

    walk_files(root, |name, path| {
        match digest_file(&path) {
            Ok(digest) => items.push(HashItem::new(name, digest)),
            Err(e) => match on_error {
                ErrorPolicy::Continue => {
                    tracing::warn!(file = %name, error = %e, "skipping unreadable file");
                }
                ErrorPolicy::Abort => return Err(e),
            },
        }
        Ok(())
    })?;

    Ok(items)
}

fn hash_pooled(root: &Path, workers: usize, on_error: ErrorPolicy) -> Result<Vec<HashItem>> {
    // enumerate first, hash afterwards
    let mut files = Vec::new();
    walk_files(root, |name, path| {
        files.push((files.len(), name, path));
        Ok(())
    })?;

    let mut slots: Vec<Option<HashItem>> = vec![None; files.len()];
    let mut first_error = None;

    let results = pool::run(files, workers, |(index, name, path)| {
        let digest = digest_file(&path);
        (index, name, digest)
    });

    for (index, name, digest) in results {
        match digest {
            Ok(digest) => slots[index] = Some(HashItem::new(name, digest)),
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "failed to hash file");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if on_error == ErrorPolicy::Abort {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// call `visit(name, path)` for each hashable file under `root`
fn walk_files<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(String, PathBuf) -> Result<()>,
{
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        if !is_regular_file(&entry) || is_root_manifest(&entry) {
            continue;
        }

        let Some(name) = manifest_name(root, entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping file with unrepresentable name");
            continue;
        };

        visit(name, entry.into_path())?;
    }
    Ok(())
}

/// regular files, and symlinks that resolve to one
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink()
        && fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false)
}

fn is_root_manifest(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_name() == MANIFEST_FILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest;
    use tempfile::tempdir;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("sub/b.txt"), "beta").unwrap();
        fs::write(dir.path().join("sub/deeper/c.txt"), "gamma").unwrap();
        dir
    }

    fn expected() -> Vec<HashItem> {
        vec![
            HashItem::new("a.txt", digest(b"alpha")),
            HashItem::new("sub/b.txt", digest(b"beta")),
            HashItem::new("sub/deeper/c.txt", digest(b"gamma")),
        ]
    }

    fn pooled(workers: usize) -> HashOptions {
        HashOptions {
            concurrency: Concurrency::new(workers, false),
            on_error: ErrorPolicy::Continue,
        }
    }

    #[test]
    fn test_hash_tree_sequential() {
        let dir = sample_tree();
        let items = hash_tree(dir.path(), &HashOptions::default()).unwrap();
        assert_eq!(items, expected());
    }

    #[test]
    fn test_hash_tree_pooled_matches_sequential() {
        let dir = sample_tree();
        let items = hash_tree(dir.path(), &pooled(4)).unwrap();
        assert_eq!(items, expected());
    }

    #[test]
    fn test_hash_tree_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(hash_tree(dir.path(), &HashOptions::default()).unwrap().is_empty());
        assert!(hash_tree(dir.path(), &pooled(3)).unwrap().is_empty());
    }

    #[test]
    fn test_hash_tree_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = hash_tree(&missing, &HashOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));

        let err = hash_tree(&missing, &pooled(2)).unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));
    }

    #[test]
    fn test_hash_tree_skips_root_manifest() {
        let dir = sample_tree();
        fs::write(dir.path().join(MANIFEST_FILE), "a.txt:ffff\n").unwrap();
        fs::write(dir.path().join("sub").join(MANIFEST_FILE), "nested").unwrap();

        let items = hash_tree(dir.path(), &HashOptions::default()).unwrap();

        assert!(!items.iter().any(|i| i.name == MANIFEST_FILE));
        assert!(items.iter().any(|i| i.name == "sub/.patch"));
    }

    #[test]
    fn test_hash_tree_skips_origin_marker_names() {
        let dir = sample_tree();
        fs::write(dir.path().join("#@notes.txt"), "notes").unwrap();
        fs::write(dir.path().join("sub/#@kept.txt"), "kept").unwrap();

        for options in [HashOptions::default(), pooled(3)] {
            let items = hash_tree(dir.path(), &options).unwrap();
            assert!(!items.iter().any(|i| i.name == "#@notes.txt"));
            assert!(items.iter().any(|i| i.name == "sub/#@kept.txt"));
            assert_eq!(items.len(), 4);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_hash_tree_unreadable_file_policy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = sample_tree();
        let locked = dir.path().join("sub/locked.txt");
        fs::write(&locked, "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // running as root, permissions are not enforced
            return;
        }

        for workers in [1, 3] {
            let cont = HashOptions {
                concurrency: Concurrency::new(workers, false),
                on_error: ErrorPolicy::Continue,
            };
            assert_eq!(hash_tree(dir.path(), &cont).unwrap(), expected());

            let abort = HashOptions {
                on_error: ErrorPolicy::Abort,
                ..cont
            };
            let err = hash_tree(dir.path(), &abort).unwrap_err();
            assert!(matches!(err, Error::Io { .. }), "workers {}: {:?}", workers, err);
        }

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_hash_tree_follows_file_symlinks_only() {
        let dir = sample_tree();
        std::os::unix::fs::symlink(dir.path().join("a.txt"), dir.path().join("link.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("dirlink")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();

        let items = hash_tree(dir.path(), &HashOptions::default()).unwrap();

        let link = items.iter().find(|i| i.name == "link.txt").unwrap();
        assert_eq!(link.digest, digest(b"alpha"));
        assert!(!items.iter().any(|i| i.name.starts_with("dirlink")));
        assert!(!items.iter().any(|i| i.name == "dangling"));
    }
}
