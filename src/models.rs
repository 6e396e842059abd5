//! Data structures exchanged between the bundler, the collector and the writer.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// The bundler's report for a single build pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilationResult {
  /// Optional compiler name, used in logs and error messages.
  pub name: Option<String>,
  /// Compilation hash substituted into `[hash]` tokens of the public path.
  pub hash: Option<String>,
  /// Prefix the bundler serves its output from, possibly empty.
  pub public_path: String,
  /// Named chunk groups in declaration order.
  pub chunk_groups: Vec<ChunkGroup>,
  /// Files contributed by other build-time plugins for the same entries.
  pub auxiliary_assets: Vec<AuxiliaryAsset>,
  /// Set when the bundler reported errors for this compilation.
  pub has_errors: bool,
}

impl CompilationResult {
  /// Name used when referring to this compilation in diagnostics.
  pub fn display_name(&self, index: usize) -> String {
    self
      .name
      .clone()
      .unwrap_or_else(|| format!("#{index}"))
  }
}

/// An entry point or shared chunk together with the files emitted for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChunkGroup {
  /// Entry or shared chunk name; becomes the manifest key.
  pub name: String,
  /// Emitted file paths in emission order.
  pub files: Vec<String>,
  /// Set for chunks split out of several entries (e.g. a `common` chunk).
  ///
  /// Files listed by a shared group are reported only under the shared group's own name.
  #[serde(default)]
  pub shared: bool,
}

impl ChunkGroup {
  /// Convenience constructor used by hosts and tests.
  pub fn new<I, S>(name: impl Into<String>, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      name: name.into(),
      files: files.into_iter().map(Into::into).collect(),
      shared: false,
    }
  }

  /// Chunk group extracted from several entries.
  pub fn shared<I, S>(name: impl Into<String>, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      shared: true,
      ..Self::new(name, files)
    }
  }
}

/// A file produced outside the chunk-group emission list, e.g. an extracted stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuxiliaryAsset {
  /// Entry whose build triggered the file.
  pub entry: String,
  /// Emitted file path.
  pub path: String,
}

/// Files recorded for one entry, keyed by manifest key (`js`, `css`, ...).
///
/// At most one path is held per key; the first recorded path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EntryManifest {
  assets: IndexMap<String, String>,
}

impl EntryManifest {
  /// Record `path` under `key` unless the key is already taken. Returns whether it was stored.
  pub fn record(&mut self, key: &str, path: impl Into<String>) -> bool {
    match self.assets.entry(key.to_string()) {
      Entry::Occupied(_) => false,
      Entry::Vacant(slot) => {
        slot.insert(path.into());
        true
      }
    }
  }

  /// Path recorded for `key`.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.assets.get(key).map(String::as_str)
  }

  /// Iterate `(key, path)` pairs in recording order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .assets
      .iter()
      .map(|(key, path)| (key.as_str(), path.as_str()))
  }

  /// Number of recorded kinds.
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  /// Whether no file has been recorded.
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EntryManifest {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut entry = EntryManifest::default();
    for (key, path) in iter {
      entry.record(&key.into(), path);
    }
    entry
  }
}

/// Mapping from entry name to the files it produced. Entries keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest {
  entries: IndexMap<String, EntryManifest>,
}

impl Manifest {
  /// Empty manifest.
  pub fn new() -> Self {
    Self::default()
  }

  /// Mutable access to `name`, creating an empty entry at the end when absent.
  pub fn entry_mut(&mut self, name: &str) -> &mut EntryManifest {
    self.entries.entry(name.to_string()).or_default()
  }

  /// Replace the whole entry `name`, keeping its position when it already exists.
  ///
  /// Returns the previous definition.
  pub fn replace(&mut self, name: impl Into<String>, entry: EntryManifest) -> Option<EntryManifest> {
    self.entries.insert(name.into(), entry)
  }

  /// Entry recorded for `name`.
  pub fn get(&self, name: &str) -> Option<&EntryManifest> {
    self.entries.get(name)
  }

  /// Iterate entries in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryManifest)> {
    self
      .entries
      .iter()
      .map(|(name, entry)| (name.as_str(), entry))
  }

  /// Entry names in order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest holds no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Drop entries that recorded no file.
  pub(crate) fn retain_non_empty(&mut self) {
    self.entries.retain(|_, entry| !entry.is_empty());
  }
}

impl IntoIterator for Manifest {
  type Item = (String, EntryManifest);
  type IntoIter = indexmap::map::IntoIter<String, EntryManifest>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl<K: Into<String>> FromIterator<(K, EntryManifest)> for Manifest {
  fn from_iter<T: IntoIterator<Item = (K, EntryManifest)>>(iter: T) -> Self {
    let mut manifest = Manifest::new();
    for (name, entry) in iter {
      manifest.replace(name, entry);
    }
    manifest
  }
}

/// Compilation results from several compiler instances sharing one manifest, in declaration order.
pub type MultiCompilationBatch = Vec<CompilationResult>;
