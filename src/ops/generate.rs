use std::path::Path;

use crate::error::Result;
use crate::filter::{self, Filter, IgnoreFilter};
use crate::manifest::Manifest;
use crate::tree::{hash_tree, HashOptions};

/// generate options
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// origin label recorded in the manifest, if any
    pub source: Option<String>,
    pub hash: HashOptions,
}

/// result of a generate operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// items written to the manifest
    pub items: usize,
    /// items dropped by ignore rules
    pub ignored: usize,
    pub origin: Option<String>,
}

/// hash `target`, apply its `.benchignore`, write its manifest
pub fn generate(target: &Path, options: &GenerateOptions) -> Result<GenerateReport> {
    let filter = IgnoreFilter::load(target);
    generate_with_filter(target, options, &filter)
}

/// like [`generate`] with caller-supplied ignore rules
pub fn generate_with_filter(
    target: &Path,
    options: &GenerateOptions,
    filter: &dyn Filter,
) -> Result<GenerateReport> {
    let hashes = hash_tree(target, &options.hash).inspect_err(|e| {
        tracing::error!(target = %target.display(), error = %e, "failed to hash directory");
    })?;

    let (items, ignored) = filter::apply(hashes, filter);
    let origin = options.source.clone().filter(|s| !s.is_empty());

    let manifest = Manifest::new(origin.clone(), items);
    manifest.save(target).inspect_err(|e| {
        tracing::error!(target = %target.display(), error = %e, "failed to write manifest");
    })?;

    if let Some(origin) = &origin {
        tracing::info!(origin = %origin, "generated manifest with source");
    }

    Ok(GenerateReport {
        items: manifest.items.len(),
        ignored,
        origin,
    })
}
