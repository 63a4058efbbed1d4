//! manifest text format
//!
//! ```text
//! #@<origin>
//! <name>:<digest>
//! <name>:<digest>
//! ```
//!
//! the origin marker line is optional and written first when present.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::write_atomic;

/// file name of the manifest at the root of a tree
pub const MANIFEST_FILE: &str = ".patch";

/// prefix of the origin line
pub const ORIGIN_MARKER: &str = "#@";

/// separator between name and digest
pub const ITEM_SEPARATOR: char = ':';

const LINE_TERMINATOR: char = '\n';

/// one file: its root-relative name and content digest
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashItem {
    pub name: String,
    pub digest: String,
}

impl HashItem {
    pub fn new(name: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            digest: digest.into(),
        }
    }
}

impl fmt::Display for HashItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, ITEM_SEPARATOR, self.digest)
    }
}

/// a tree's items plus where they were last fetched from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub origin: Option<String>,
    pub items: Vec<HashItem>,
}

impl Manifest {
    pub fn new(origin: Option<String>, items: Vec<HashItem>) -> Self {
        Self { origin, items }
    }

    /// render the manifest text
    pub fn encode(&self) -> String {
        let mut out = String::new();

        if let Some(origin) = self.origin.as_deref().filter(|o| !o.is_empty()) {
            out.push_str(ORIGIN_MARKER);
            out.push_str(origin);
            out.push(LINE_TERMINATOR);
        }

        for item in &self.items {
            out.push_str(&item.to_string());
            out.push(LINE_TERMINATOR);
        }

        out
    }

    /// parse manifest text
    ///
    /// never fails: lines without a separator are dropped, and if several
    /// origin lines appear the last one wins.
    pub fn decode(text: &str) -> Self {
        let mut manifest = Manifest::default();

        for line in text.split(LINE_TERMINATOR) {
            // names may start or end with spaces; only a CRLF terminator is stripped
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some(origin) = line.strip_prefix(ORIGIN_MARKER) {
                manifest.origin = Some(origin.to_string());
                continue;
            }

            // digests never contain the separator, names may
            let Some((name, digest)) = line.rsplit_once(ITEM_SEPARATOR) else {
                continue;
            };
            manifest.items.push(HashItem::new(name, digest));
        }

        tracing::debug!(
            items = manifest.items.len(),
            origin = manifest.origin.as_deref().unwrap_or(""),
            "parsed manifest"
        );
        manifest
    }

    /// path of the manifest file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// read the manifest stored in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        let bytes = fs::read(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self::decode(&String::from_utf8_lossy(&bytes)))
    }

    /// overwrite the manifest stored in `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        write_atomic(&path, self.encode().as_bytes())?;
        tracing::info!(
            path = %path.display(),
            items = self.items.len(),
            origin = self.origin.as_deref().unwrap_or(""),
            "wrote manifest"
        );
        Ok(())
    }
}
