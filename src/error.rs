//! Error taxonomy shared by the collector, writer and plugin adapter.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Failures surfaced while producing or persisting a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
  /// The bundler reported errors for a compilation, so no manifest is produced for it.
  #[error("compilation {compilation} reported errors; manifest not written")]
  CompilationFailed {
    /// Compiler name, or its position in the batch when unnamed.
    compilation: String,
  },

  /// A batch finished but at least one of its compilations failed earlier.
  #[error("{failed} compilation(s) in the batch failed; manifest not written")]
  BatchFailed {
    /// Number of failed compilations in the batch.
    failed: usize,
  },

  /// A compilation reported a slot outside of the expected batch size.
  #[error("compilation index {index} is out of range for a batch of {expected}")]
  UnknownCompilation {
    /// Index supplied by the caller.
    index: usize,
    /// Number of compilations the batch was created for.
    expected: usize,
  },

  /// The existing manifest could not be parsed; recovered by starting from an empty manifest.
  #[error("existing manifest at {} is unreadable: {source}", path.display())]
  PriorManifestUnreadable {
    /// Manifest path that failed to load.
    path: PathBuf,
    /// Read or parse error.
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The destination directory or file could not be written.
  #[error("failed to write manifest to {}: {source}", path.display())]
  WriteFailure {
    /// Path that could not be created or written.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },

  /// An entry shares its name with the configured metadata key.
  #[error("entry {name} collides with the metadata key; rename the entry or drop the metadata")]
  ReservedEntryName {
    /// Entry name that clashed.
    name: String,
  },

  /// The manifest could not be serialised.
  #[error("failed to serialise manifest: {0}")]
  Serialize(#[from] serde_json::Error),
}

impl ManifestError {
  pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::WriteFailure {
      path: path.into(),
      source,
    }
  }
}
