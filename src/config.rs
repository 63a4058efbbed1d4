use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::logging::LogConfig;
use crate::ops::{FetchOptions, GenerateOptions};
use crate::origin::OriginConfig;
use crate::pool::{Concurrency, ErrorPolicy};
use crate::tree::HashOptions;

/// file name looked up in the working directory when no config path is given
pub const CONFIG_FILE: &str = "bench.toml";

/// settings stored in bench.toml
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub http: OriginConfig,
    pub log: LogConfig,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// load `dir/bench.toml` if it exists, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn concurrency(&self) -> Concurrency {
        Concurrency::new(self.pool.workers, self.pool.dynamic)
    }

    pub fn generate_options(&self, source: Option<String>) -> GenerateOptions {
        GenerateOptions {
            source,
            hash: HashOptions {
                concurrency: self.concurrency(),
                on_error: self.pool.on_error,
            },
        }
    }

    pub fn fetch_options(&self, source: Option<String>) -> FetchOptions {
        FetchOptions {
            source,
            concurrency: self.concurrency(),
            on_error: self.pool.on_error,
            origin: self.http.clone(),
        }
    }
}

/// worker pool settings shared by hashing and fetching
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    pub dynamic: bool,
    pub on_error: ErrorPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let concurrency = Concurrency::default();
        Self {
            workers: concurrency.workers,
            dynamic: concurrency.dynamic,
            on_error: ErrorPolicy::default(),
        }
    }
}
