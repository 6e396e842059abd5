//! Providers for files emitted outside of the regular chunk-group lists.

use crate::asset_paths::interpolate_hash;
use crate::models::CompilationResult;

/// Trait implemented by build-time plugins that emit files on behalf of entries.
pub trait AuxiliaryAssetProvider: Send + Sync {
  /// Yield `(entry name, emitted path)` pairs produced for `result`.
  fn auxiliary_assets(&self, result: &CompilationResult) -> Vec<(String, String)>;
}

/// Reports the auxiliary assets the bundler embedded in the compilation result itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAuxiliaryAssets;

impl AuxiliaryAssetProvider for EmbeddedAuxiliaryAssets {
  fn auxiliary_assets(&self, result: &CompilationResult) -> Vec<(String, String)> {
    result
      .auxiliary_assets
      .iter()
      .map(|asset| (asset.entry.clone(), asset.path.clone()))
      .collect()
  }
}

/// Stylesheets written by a CSS extraction step, one per chunk group.
///
/// The filename template supports `[name]` (chunk group name) plus `[hash]` and `[hash:N]`
/// (compilation hash, optionally truncated).
/// Only the listed entries are reported when a restriction is configured.
#[derive(Debug, Clone)]
pub struct ExtractedStylesheets {
  filename_template: String,
  only: Option<Vec<String>>,
}

impl ExtractedStylesheets {
  /// Extraction step producing a stylesheet for every chunk group.
  pub fn new(filename_template: impl Into<String>) -> Self {
    Self {
      filename_template: filename_template.into(),
      only: None,
    }
  }

  /// Restrict extraction to the named entries.
  pub fn for_entries<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.only = Some(entries.into_iter().map(Into::into).collect());
    self
  }

  fn render(&self, name: &str, hash: Option<&str>) -> String {
    let rendered = self.filename_template.replace("[name]", name);
    match hash {
      Some(hash) => interpolate_hash(&rendered, hash).into_owned(),
      None => rendered,
    }
  }
}

impl AuxiliaryAssetProvider for ExtractedStylesheets {
  fn auxiliary_assets(&self, result: &CompilationResult) -> Vec<(String, String)> {
    result
      .chunk_groups
      .iter()
      .filter(|group| {
        self
          .only
          .as_ref()
          .is_none_or(|only| only.iter().any(|name| name == &group.name))
      })
      .map(|group| {
        (
          group.name.clone(),
          self.render(&group.name, result.hash.as_deref()),
        )
      })
      .collect()
  }
}
