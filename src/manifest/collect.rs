//! Extract per-entry asset mappings from a single compilation result.

use std::collections::BTreeSet;

use tracing::debug;

use crate::asset_paths::{
  AssetKind, classify, interpolate_public_path, other_extension, resolve_public_path,
};
use crate::auxiliary::{AuxiliaryAssetProvider, EmbeddedAuxiliaryAssets};
use crate::models::{CompilationResult, EntryManifest, Manifest};

/// Options controlling which files the collector records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorOptions {
  /// Record files that are neither scripts, stylesheets nor their maps, keyed by extension.
  pub include_other: bool,
}

/// Walks the chunk groups of a compilation and records each entry's files by kind.
pub struct AssetCollector {
  options: CollectorOptions,
  providers: Vec<Box<dyn AuxiliaryAssetProvider>>,
}

impl AssetCollector {
  /// Collector reporting chunk-group files plus the result's embedded auxiliary assets.
  pub fn new(options: CollectorOptions) -> Self {
    Self {
      options,
      providers: vec![Box::new(EmbeddedAuxiliaryAssets)],
    }
  }

  /// Register an additional provider of auxiliary assets.
  pub fn with_provider(mut self, provider: impl AuxiliaryAssetProvider + 'static) -> Self {
    self.providers.push(Box::new(provider));
    self
  }

  /// Produce the manifest for one compilation.
  ///
  /// Within one pass the first file of a kind wins for each entry. Files owned by shared
  /// chunk groups are only reported under the shared group. Entries that end up without any
  /// recorded file are omitted.
  pub fn collect(&self, result: &CompilationResult) -> Manifest {
    let public_path = interpolate_public_path(&result.public_path, result.hash.as_deref());
    let shared_files: BTreeSet<&str> = result
      .chunk_groups
      .iter()
      .filter(|group| group.shared)
      .flat_map(|group| group.files.iter().map(String::as_str))
      .collect();

    let mut manifest = Manifest::new();

    for group in &result.chunk_groups {
      let entry = manifest.entry_mut(&group.name);
      for file in &group.files {
        if !group.shared && shared_files.contains(file.as_str()) {
          continue;
        }
        self.record(entry, &group.name, &public_path, file);
      }
    }

    for provider in &self.providers {
      for (name, file) in provider.auxiliary_assets(result) {
        let entry = manifest.entry_mut(&name);
        self.record(entry, &name, &public_path, &file);
      }
    }

    manifest.retain_non_empty();
    manifest
  }

  fn record(&self, entry: &mut EntryManifest, name: &str, public_path: &str, file: &str) {
    let kind = classify(file);
    let key = match kind.manifest_key() {
      Some(key) => key.to_string(),
      None if self.options.include_other => match other_extension(file) {
        Some(extension) => extension,
        None => return,
      },
      None => return,
    };

    let resolved = resolve_public_path(public_path, file);
    if entry.record(&key, resolved.as_str()) {
      debug!(entry = name, kind = %kind, path = %resolved, "recorded asset");
    } else if kind != AssetKind::Other {
      debug!(
        entry = name,
        kind = %kind,
        path = %resolved,
        "entry already has an asset of this kind, skipping"
      );
    }
  }
}

impl Default for AssetCollector {
  fn default() -> Self {
    Self::new(CollectorOptions::default())
  }
}
