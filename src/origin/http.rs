//! origin served over plain HTTP(S) GET requests

use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{Error, Result};
use crate::fs::check_name;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::origin::{Origin, OriginConfig};

/// a tree published under a base URL
///
/// `get("dir/file")` requests `<base>/dir/file`. requests are
/// unauthenticated; a non-success status is an error.
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    base: Url,
    locator: String,
    client: Client,
}

impl HttpOrigin {
    pub fn new(locator: &str, config: &OriginConfig) -> Result<Self> {
        let base = Url::parse(locator).map_err(|e| Error::InvalidUrl {
            url: locator.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: locator.to_string(),
                message: "url cannot carry a path".to_string(),
            });
        }

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("bench/", env!("CARGO_PKG_VERSION")));
        builder = builder.timeout(config.timeout());
        let client = builder.build().map_err(|source| Error::Http {
            url: locator.to_string(),
            source,
        })?;

        Ok(Self {
            base,
            locator: locator.to_string(),
            client,
        })
    }

    /// url of a file below the base
    pub fn url_for(&self, name: &str) -> Result<Url> {
        check_name(name)?;

        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| Error::InvalidUrl {
                url: self.locator.clone(),
                message: "url cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty();
            for part in name.split('/').filter(|p| !p.is_empty() && *p != ".") {
                segments.push(part);
            }
        }
        Ok(url)
    }
}

impl Origin for HttpOrigin {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.url_for(name)?;
        let url_text = url.to_string();

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| Error::Http {
                url: url_text.clone(),
                source,
            })?;

        let body = response.bytes().map_err(|source| Error::Http {
            url: url_text,
            source,
        })?;
        Ok(body.to_vec())
    }

    /// unlike a file origin, a missing remote manifest is an error
    fn scan(&self) -> Result<Manifest> {
        let data = self.get(MANIFEST_FILE)?;
        let manifest = Manifest::decode(&String::from_utf8_lossy(&data));
        tracing::info!(
            base = %self.base,
            items = manifest.items.len(),
            "scanned http origin"
        );
        Ok(manifest)
    }
}
