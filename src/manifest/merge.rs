//! Combine manifests from several compilations or from a prior on-disk manifest.

use tracing::debug;

use crate::models::Manifest;

/// Merge manifests in order; a later definition of an entry replaces the earlier one whole.
///
/// Entries missing from later manifests are preserved. Keys keep first-seen order, with
/// replaced entries staying at their original position.
pub fn merge<I>(manifests: I) -> Manifest
where
  I: IntoIterator<Item = Manifest>,
{
  let mut merged = Manifest::new();

  for manifest in manifests {
    for (name, entry) in manifest {
      if merged.get(&name).is_some_and(|existing| existing != &entry) {
        debug!(entry = %name, "later manifest replaces entry");
      }
      merged.replace(name, entry);
    }
  }

  merged
}
