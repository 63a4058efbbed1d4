use std::collections::HashSet;

use crate::manifest::HashItem;

/// reference items whose (name, digest) pair is not present in `local`
///
/// a name present locally with different content counts as missing. local
/// items absent from the reference are ignored, so the result never asks for
/// a deletion. the result keeps reference order.
pub fn missing(local: &[HashItem], reference: &[HashItem]) -> Vec<HashItem> {
    let present: HashSet<(&str, &str)> = local
        .iter()
        .map(|item| (item.name.as_str(), item.digest.as_str()))
        .collect();

    let missing: Vec<HashItem> = reference
        .iter()
        .filter(|item| !present.contains(&(item.name.as_str(), item.digest.as_str())))
        .cloned()
        .collect();

    tracing::info!(
        local = local.len(),
        reference = reference.len(),
        missing = missing.len(),
        "compared manifests"
    );
    missing
}
