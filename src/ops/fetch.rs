use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::diff::missing;
use crate::error::{Error, Result};
use crate::fs::{safe_join, write_atomic};
use crate::hash::digest;
use crate::manifest::{HashItem, Manifest};
use crate::origin::{resolve_origin, FileOrigin, Origin, OriginConfig};
use crate::pool::{self, Concurrency, ErrorPolicy};

/// fetch options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// reference locator; overrides the origin recorded in the local manifest
    pub source: Option<String>,
    pub concurrency: Concurrency,
    pub on_error: ErrorPolicy,
    pub origin: OriginConfig,
}

/// one item that could not be brought up to date
#[derive(Debug)]
pub struct FetchFailure {
    pub name: String,
    pub error: Error,
}

/// result of a fetch operation
#[derive(Debug)]
pub struct FetchReport {
    /// locator the reference was reached through
    pub locator: String,
    /// origin recorded in the reference manifest
    pub reference_origin: Option<String>,
    /// true when the reference manifest names the locator as its origin
    pub verified: bool,
    /// reference items missing locally before the fetch
    pub missing: usize,
    pub fetched: Vec<String>,
    pub failed: Vec<FetchFailure>,
}

/// bring `target` up to date with its reference tree
///
/// files are only added or replaced, never deleted. per-file failures are
/// logged and reported without failing the call unless `on_error` is
/// [`ErrorPolicy::Abort`].
pub fn fetch(target: &Path, options: &FetchOptions) -> Result<FetchReport> {
    let local = FileOrigin::new(target).scan()?;

    let locator = options
        .source
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| local.origin.clone().filter(|s| !s.is_empty()))
        .ok_or(Error::NoSource)?;

    let reference = resolve_origin(&locator, &options.origin).inspect_err(|e| {
        tracing::error!(locator = %locator, error = %e, "bad reference origin");
    })?;

    pull(target, &local, reference.as_ref(), options)
}

/// like [`fetch`] against an already constructed reference origin
pub fn fetch_from(
    target: &Path,
    reference: &dyn Origin,
    options: &FetchOptions,
) -> Result<FetchReport> {
    let local = FileOrigin::new(target).scan()?;
    pull(target, &local, reference, options)
}

fn pull(
    target: &Path,
    local: &Manifest,
    reference: &dyn Origin,
    options: &FetchOptions,
) -> Result<FetchReport> {
    let locator = reference.locator().to_string();
    let remote = reference.scan().inspect_err(|e| {
        tracing::error!(locator = %locator, error = %e, "failed to scan reference");
    })?;

    let label = remote.origin.clone().filter(|s| !s.is_empty());
    let verified = label.as_deref() == Some(locator.as_str());
    if verified {
        tracing::info!(origin = %locator, "verified origin");
    } else {
        tracing::warn!(
            origin = label.as_deref().unwrap_or(""),
            locator = %locator,
            "unverified origin"
        );
    }

    let wanted = missing(&local.items, &remote.items);
    let (fetched, failed) = fetch_items(target, reference, &wanted, options)?;
    tracing::info!(
        fetched = fetched.len(),
        failed = failed.len(),
        "fetched files from origin"
    );

    let manifest = Manifest::new(
        Some(label.clone().unwrap_or_else(|| locator.clone())),
        updated_items(&local.items, &remote.items, &failed),
    );
    manifest.save(target).inspect_err(|e| {
        tracing::error!(target = %target.display(), error = %e, "failed to write manifest");
    })?;

    Ok(FetchReport {
        locator,
        reference_origin: label,
        verified,
        missing: wanted.len(),
        fetched,
        failed,
    })
}

/// download `items` into `target`, returning the names fetched and the failures
fn fetch_items(
    target: &Path,
    origin: &dyn Origin,
    items: &[HashItem],
    options: &FetchOptions,
) -> Result<(Vec<String>, Vec<FetchFailure>)> {
    let mut fetched = Vec::new();
    let mut failed = Vec::new();

    if !options.concurrency.is_pooled() {
        for item in items {
            match fetch_item(target, origin, item) {
                Ok(()) => fetched.push(item.name.clone()),
                Err(error) => {
                    tracing::warn!(file = %item.name, error = %error, "failed to fetch file");
                    if options.on_error == ErrorPolicy::Abort {
                        return Err(error);
                    }
                    failed.push(FetchFailure {
                        name: item.name.clone(),
                        error,
                    });
                }
            }
        }
        return Ok((fetched, failed));
    }

    let workers = options.concurrency.effective();
    tracing::info!(workers, "using worker pool");
    let results = pool::run(items.iter().collect(), workers, |item: &HashItem| {
        (item.name.clone(), fetch_item(target, origin, item))
    });

    for (name, result) in results {
        match result {
            Ok(()) => fetched.push(name),
            Err(error) => {
                tracing::warn!(file = %name, error = %error, "failed to fetch file");
                failed.push(FetchFailure { name, error });
            }
        }
    }

    if options.on_error == ErrorPolicy::Abort && !failed.is_empty() {
        return Err(failed.swap_remove(0).error);
    }
    Ok((fetched, failed))
}

fn fetch_item(target: &Path, origin: &dyn Origin, item: &HashItem) -> Result<()> {
    let path = safe_join(target, &item.name)?;
    let data = origin.get(&item.name)?;

    if digest(&data) != item.digest {
        // the reference still wins; its manifest may be stale
        tracing::warn!(file = %item.name, "content does not match manifest digest");
    }

    write_atomic(&path, &data)
}

/// manifest items describing `target` after a fetch
///
/// the reference set, except that items which failed keep their previous
/// local entry (or stay absent), so the next fetch tries them again.
fn updated_items(
    local: &[HashItem],
    reference: &[HashItem],
    failed: &[FetchFailure],
) -> Vec<HashItem> {
    if failed.is_empty() {
        return reference.to_vec();
    }

    let failed: HashSet<&str> = failed.iter().map(|f| f.name.as_str()).collect();
    let previous: HashMap<&str, &HashItem> =
        local.iter().map(|item| (item.name.as_str(), item)).collect();

    reference
        .iter()
        .filter_map(|item| {
            if failed.contains(item.name.as_str()) {
                previous.get(item.name.as_str()).map(|&prev| prev.clone())
            } else {
                Some(item.clone())
            }
        })
        .collect()
}
