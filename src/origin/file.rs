//! origin backed by a local directory

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};
use crate::fs::safe_join;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::origin::Origin;

/// a tree on the local filesystem
#[derive(Debug, Clone)]
pub struct FileOrigin {
    root: PathBuf,
    locator: String,
}

impl FileOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let locator = root.to_string_lossy().into_owned();
        Self { root, locator }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Origin for FileOrigin {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let path = safe_join(&self.root, name)?;
        fs::read(&path).with_path(path)
    }

    /// a directory without a manifest scans as empty
    fn scan(&self) -> Result<Manifest> {
        let manifest = match self.get(MANIFEST_FILE) {
            Ok(data) => Manifest::decode(&String::from_utf8_lossy(&data)),
            Err(e) if e.is_not_found() => {
                tracing::info!(root = %self.root.display(), "no manifest, treating as empty");
                Manifest::default()
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            root = %self.root.display(),
            items = manifest.items.len(),
            "scanned file origin"
        );
        Ok(manifest)
    }
}
