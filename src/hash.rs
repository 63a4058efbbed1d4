use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{IoResultExt, Result};

/// length of a hex digest in characters
pub const DIGEST_HEX_LEN: usize = 64;

/// lowercase hex SHA-256 of a byte buffer
pub fn digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// digest of a file's content, streamed rather than read whole
///
/// follows symlinks, so a link to a regular file hashes the target's bytes.
pub fn digest_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_path(path)?;
    let mut hasher = FileHasher::new();
    io::copy(&mut file, &mut hasher).with_path(path)?;
    Ok(hasher.finalize())
}

/// streaming hasher producing the same digest as [`digest`]
pub struct FileHasher {
    hasher: Sha256,
}

impl FileHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// feed content bytes
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// finalize and return hex digest
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for FileHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
