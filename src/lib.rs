//! bench - content-hash directory patching
//!
//! keeps a local directory in step with a reference tree by comparing file
//! digests instead of timestamps. each tree carries a manifest listing every
//! file's relative name and content digest; a fetch downloads only the files
//! whose (name, digest) pair the local manifest lacks.
//!
//! # Core concepts
//!
//! - **Manifest**: the `.patch` file at a tree root, one `name:digest` line per
//!   file, optionally preceded by a `#@origin` line
//! - **Origin**: somewhere a reference tree can be read from, either a local
//!   directory or an HTTP base URL
//! - **Diff**: reference items whose (name, digest) pair is absent locally
//!
//! files are only ever added or replaced, never deleted.
//!
//! # Example usage
//!
//! ```no_run
//! use bench::ops::{self, FetchOptions, GenerateOptions};
//! use std::path::Path;
//!
//! // publish a tree
//! let options = GenerateOptions {
//!     source: Some("https://example.com/tree".to_string()),
//!     ..GenerateOptions::default()
//! };
//! ops::generate(Path::new("/srv/tree"), &options).unwrap();
//!
//! // bring a copy up to date
//! let options = FetchOptions {
//!     source: Some("https://example.com/tree".to_string()),
//!     ..FetchOptions::default()
//! };
//! let report = ops::fetch(Path::new("/opt/tree"), &options).unwrap();
//! println!("fetched {} files", report.fetched.len());
//! ```

mod config;
mod error;
mod hash;

pub mod diff;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod ops;
pub mod origin;
pub mod pool;
pub mod tree;

pub use config::{Config, PoolConfig, CONFIG_FILE};
pub use error::{Error, IoResultExt, Result};
pub use filter::{Filter, IgnoreFilter, IGNORE_FILE};
pub use hash::{digest, digest_file, FileHasher, DIGEST_HEX_LEN};
pub use manifest::{HashItem, Manifest, MANIFEST_FILE};
pub use origin::{resolve_origin, FileOrigin, HttpOrigin, Origin, OriginConfig};
pub use pool::{Concurrency, ErrorPolicy};
pub use tree::{hash_tree, HashOptions};
