//! Plugin configuration loader describing where and how the manifest is written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::manifest::CollectorOptions;
use crate::writer::WriterOptions;

/// Configuration file searched for by [`PluginConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "bundle-manifest.config.json";

/// Immutable plugin configuration handed to each component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
  /// Directory the manifest is written to.
  pub path: String,
  /// Manifest file name inside `path`.
  pub filename: String,
  /// Merge into an existing manifest file instead of overwriting it.
  pub update: bool,
  /// Indent the JSON output.
  pub pretty_print: bool,
  /// Several independent compilers contribute to one manifest.
  pub multi_compiler: bool,
  /// In a multi-compiler batch, write after each compilation instead of once at the end.
  pub write_incrementally: bool,
  /// Record files of other kinds keyed by their extension.
  pub include_other: bool,
  /// Arbitrary JSON stored under the `metadata` key of the written document.
  pub metadata: Option<Value>,
}

impl Default for PluginConfig {
  fn default() -> Self {
    Self {
      path: ".".into(),
      filename: "webpack-assets.json".into(),
      update: false,
      pretty_print: false,
      multi_compiler: false,
      write_incrementally: false,
      include_other: false,
      metadata: None,
    }
  }
}

impl PluginConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to default
  /// values so the build can still produce a manifest.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_else(|| {
      debug!(path = %candidate.display(), "using default manifest configuration");
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
      Ok(config) => Some(config),
      Err(err) => {
        warn!(path = %path.display(), error = %err, "failed to parse manifest configuration");
        None
      }
    }
  }

  /// Full path of the manifest file.
  pub fn destination(&self) -> PathBuf {
    Path::new(&self.path).join(&self.filename)
  }

  /// Writer options derived from this configuration.
  ///
  /// Incremental multi-compiler writes always go through the update path so earlier
  /// compilations in the batch are kept.
  pub fn writer_options(&self) -> WriterOptions {
    WriterOptions {
      pretty_print: self.pretty_print,
      update_existing: self.update || self.writes_incrementally(),
      metadata: self.metadata.clone(),
    }
  }

  /// Collector options derived from this configuration.
  pub fn collector_options(&self) -> CollectorOptions {
    CollectorOptions {
      include_other: self.include_other,
    }
  }

  /// Whether each compilation of a multi-compiler batch is written as it completes.
  pub fn writes_incrementally(&self) -> bool {
    self.multi_compiler && self.write_incrementally
  }
}
