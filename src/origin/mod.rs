//! places a reference tree can be read from
//!
//! an origin serves its manifest (`scan`) and individual files by manifest
//! name (`get`). new kinds of origin are new implementations of [`Origin`];
//! the fetch operation only sees the trait.

pub mod file;
pub mod http;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::Manifest;

pub use file::FileOrigin;
pub use http::HttpOrigin;

/// a readable tree
pub trait Origin: Send + Sync {
    /// the string this origin was resolved from
    fn locator(&self) -> &str;

    /// fetch a file by manifest name
    fn get(&self, name: &str) -> Result<Vec<u8>>;

    /// fetch and parse the origin's manifest
    fn scan(&self) -> Result<Manifest>;
}

/// settings for network origins
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// seconds allowed for establishing a connection
    pub connect_timeout_secs: u64,
    /// seconds allowed for a whole request, 0 disables the limit
    pub timeout_secs: u64,
}

impl OriginConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 300,
        }
    }
}

/// pick an origin implementation for a locator
///
/// `http://` and `https://` select [`HttpOrigin`], an absolute path selects
/// [`FileOrigin`], anything else is [`Error::UnknownOrigin`].
pub fn resolve_origin(locator: &str, config: &OriginConfig) -> Result<Box<dyn Origin>> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        tracing::debug!(locator, "resolved http origin");
        return Ok(Box::new(HttpOrigin::new(locator, config)?));
    }

    if Path::new(locator).is_absolute() {
        tracing::debug!(locator, "resolved file origin");
        return Ok(Box::new(FileOrigin::new(locator)));
    }

    Err(Error::UnknownOrigin(locator.to_string()))
}
