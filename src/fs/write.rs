use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// replace `path` with `content` atomically: temp -> fsync -> rename
///
/// the temp file lives next to the destination so the rename never crosses
/// filesystems. parent directories are created as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_path(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = (|| {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(content).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
        fs::rename(&tmp_path, path).with_path(path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written?;

    fsync_dir(parent)
}

/// sync a directory to disk
#[cfg(unix)]
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

/// directories cannot be opened for syncing on this platform
#[cfg(not(unix))]
pub fn fsync_dir(_path: &Path) -> Result<()> {
    Ok(())
}
