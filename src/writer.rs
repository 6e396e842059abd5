//! Persisting manifests to disk and loading previously written ones.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tempfile::Builder;
use tracing::{debug, info, warn};

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::merge;
use crate::models::{EntryManifest, Manifest};

/// Top-level key holding configured metadata in the written document.
pub const METADATA_KEY: &str = "metadata";

/// Options controlling how the manifest is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterOptions {
  /// Indent the JSON output. Formatting only.
  pub pretty_print: bool,
  /// Merge into the manifest already at the destination instead of replacing it.
  pub update_existing: bool,
  /// Arbitrary JSON stored under [`METADATA_KEY`].
  pub metadata: Option<Value>,
}

#[derive(Serialize)]
struct ManifestDocumentRef<'a> {
  #[serde(flatten)]
  entries: &'a Manifest,
  #[serde(skip_serializing_if = "Option::is_none")]
  metadata: Option<&'a Value>,
}

/// Serialises manifests and writes them atomically.
#[derive(Debug, Clone, Default)]
pub struct ManifestWriter {
  options: WriterOptions,
}

impl ManifestWriter {
  /// Create a writer with the provided options.
  pub fn new(options: WriterOptions) -> Self {
    Self { options }
  }

  /// Options this writer was created with.
  pub fn options(&self) -> &WriterOptions {
    &self.options
  }

  /// Render the manifest document as it would be written.
  ///
  /// Fails with [`ManifestError::ReservedEntryName`] when metadata is configured and an entry
  /// is named [`METADATA_KEY`].
  pub fn render(&self, manifest: &Manifest) -> ManifestResult<String> {
    if self.options.metadata.is_some() && manifest.get(METADATA_KEY).is_some() {
      return Err(ManifestError::ReservedEntryName {
        name: METADATA_KEY.to_string(),
      });
    }

    let document = ManifestDocumentRef {
      entries: manifest,
      metadata: self.options.metadata.as_ref(),
    };

    let rendered = if self.options.pretty_print {
      serde_json::to_string_pretty(&document)?
    } else {
      serde_json::to_string(&document)?
    };
    Ok(rendered)
  }

  /// Write `manifest` to `destination` and return the manifest that ended up on disk.
  ///
  /// In update mode the existing file is merged underneath `manifest` first; a missing or
  /// unreadable file counts as an empty manifest. The destination directory is created when
  /// absent, and the file is replaced through a rename so readers never see partial output.
  pub fn write(&self, manifest: &Manifest, destination: &Path) -> ManifestResult<Manifest> {
    let final_manifest = if self.options.update_existing {
      let prior = match self.read_existing(destination) {
        Ok(prior) => prior,
        Err(err) => {
          warn!(error = %err, "ignoring existing manifest");
          Manifest::new()
        }
      };
      merge([prior, manifest.clone()])
    } else {
      manifest.clone()
    };

    let contents = self.render(&final_manifest)?;
    write_atomic(destination, contents.as_bytes())?;

    info!(
      path = %destination.display(),
      entries = final_manifest.len(),
      "wrote manifest"
    );
    Ok(final_manifest)
  }

  /// Load the manifest at `path` the way this writer produced it.
  ///
  /// The metadata key is skipped only when this writer is configured with metadata.
  pub fn read_existing(&self, path: &Path) -> ManifestResult<Manifest> {
    let reserved = self.options.metadata.as_ref().map(|_| METADATA_KEY);
    load_manifest(path, reserved)
  }
}

/// Load a manifest previously written without metadata.
///
/// A missing file yields an empty manifest. Every top-level key is read as an entry; use
/// [`ManifestWriter::read_existing`] for files carrying a metadata block.
pub fn read_manifest(path: &Path) -> ManifestResult<Manifest> {
  load_manifest(path, None)
}

fn unreadable(
  path: &Path,
  source: impl std::error::Error + Send + Sync + 'static,
) -> ManifestError {
  ManifestError::PriorManifestUnreadable {
    path: path.to_path_buf(),
    source: Box::new(source),
  }
}

fn load_manifest(path: &Path, reserved: Option<&str>) -> ManifestResult<Manifest> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => {
      debug!(path = %path.display(), "no existing manifest");
      return Ok(Manifest::new());
    }
    Err(err) => return Err(unreadable(path, err)),
  };

  if content.trim().is_empty() {
    return Ok(Manifest::new());
  }

  let document: IndexMap<String, Value> =
    serde_json::from_str(&content).map_err(|err| unreadable(path, err))?;
  document
    .into_iter()
    .filter(|(name, _)| Some(name.as_str()) != reserved)
    .map(|(name, value)| serde_json::from_value::<EntryManifest>(value).map(|entry| (name, entry)))
    .collect::<Result<Manifest, _>>()
    .map_err(|err| unreadable(path, err))
}

fn write_atomic(destination: &Path, contents: &[u8]) -> ManifestResult<()> {
  let directory = match destination.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  fs::create_dir_all(directory).map_err(|err| ManifestError::write_failure(directory, err))?;

  let mut builder = Builder::new();
  builder.prefix(".manifest-").suffix(".tmp");
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o644));
  }

  let mut temp = builder
    .tempfile_in(directory)
    .map_err(|err| ManifestError::write_failure(directory, err))?;
  temp
    .write_all(contents)
    .and_then(|()| temp.as_file().sync_all())
    .map_err(|err| ManifestError::write_failure(temp.path(), err))?;
  temp
    .persist(destination)
    .map_err(|err| ManifestError::write_failure(destination, err.error))?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  fn manifest(entries: &[(&str, &str, &str)]) -> Manifest {
    let mut manifest = Manifest::new();
    for (name, key, path) in entries {
      manifest.entry_mut(name).record(key, *path);
    }
    manifest
  }

  #[test]
  fn writes_compact_json_and_creates_directories() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("nested/out/webpack-assets.json");

    ManifestWriter::default()
      .write(&manifest(&[("main", "js", "index-bundle.js")]), &destination)
      .unwrap();

    let content = fs::read_to_string(&destination).unwrap();
    assert_eq!(content, r#"{"main":{"js":"index-bundle.js"}}"#);
  }

  #[test]
  fn pretty_print_changes_formatting_only() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let written = manifest(&[("main", "js", "main.js"), ("main", "css", "main.css")]);

    ManifestWriter::new(WriterOptions {
      pretty_print: true,
      ..WriterOptions::default()
    })
    .write(&written, &destination)
    .unwrap();

    let content = fs::read_to_string(&destination).unwrap();
    assert!(content.contains('\n'));
    let reparsed: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(reparsed, json!({"main": {"js": "main.js", "css": "main.css"}}));
  }

  #[test]
  fn round_trips_through_reader() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let written = manifest(&[
      ("main", "js", "/public/main.js?abc123"),
      ("main", "jsSourceMap", "/public/main.js.map?abc123"),
      ("common", "js", "/public/common.js"),
    ]);

    ManifestWriter::default().write(&written, &destination).unwrap();

    assert_eq!(read_manifest(&destination).unwrap(), written);
  }

  #[test]
  fn update_mode_merges_with_existing_file() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    fs::write(
      &destination,
      r#"{"admin":{"js":"admin-1.js"},"main":{"js":"main-1.js","css":"main-1.css"}}"#,
    )
    .unwrap();

    let writer = ManifestWriter::new(WriterOptions {
      update_existing: true,
      ..WriterOptions::default()
    });
    let result = writer
      .write(&manifest(&[("main", "js", "main-2.js")]), &destination)
      .unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), vec!["admin", "main"]);
    assert_eq!(result.get("main"), Some(&EntryManifest::from_iter([("js", "main-2.js")])));
    assert_eq!(read_manifest(&destination).unwrap(), result);
  }

  #[test]
  fn update_mode_treats_corrupt_file_as_empty() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    fs::write(&destination, "{not json").unwrap();

    assert!(matches!(
      read_manifest(&destination),
      Err(ManifestError::PriorManifestUnreadable { .. })
    ));

    let writer = ManifestWriter::new(WriterOptions {
      update_existing: true,
      ..WriterOptions::default()
    });
    let result = writer
      .write(&manifest(&[("main", "js", "main.js")]), &destination)
      .unwrap();

    assert_eq!(result, manifest(&[("main", "js", "main.js")]));
  }

  #[test]
  fn overwrite_mode_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    fs::write(&destination, r#"{"stale":{"js":"stale.js"}}"#).unwrap();

    ManifestWriter::default()
      .write(&manifest(&[("main", "js", "main.js")]), &destination)
      .unwrap();

    assert_eq!(
      fs::read_to_string(&destination).unwrap(),
      r#"{"main":{"js":"main.js"}}"#
    );
  }

  #[test]
  fn metadata_is_written_and_ignored_on_read() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let writer = ManifestWriter::new(WriterOptions {
      metadata: Some(json!({"version": "1.4.0"})),
      ..WriterOptions::default()
    });
    let written = manifest(&[("main", "js", "main.js")]);

    writer.write(&written, &destination).unwrap();

    let content = fs::read_to_string(&destination).unwrap();
    assert_eq!(
      content,
      r#"{"main":{"js":"main.js"},"metadata":{"version":"1.4.0"}}"#
    );
    assert_eq!(writer.read_existing(&destination).unwrap(), written);
  }

  #[test]
  fn entry_named_metadata_round_trips_without_configured_metadata() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let written = manifest(&[("metadata", "js", "metadata.js"), ("main", "js", "main.js")]);

    ManifestWriter::default().write(&written, &destination).unwrap();

    let read = read_manifest(&destination).unwrap();
    assert_eq!(read.names().collect::<Vec<_>>(), vec!["metadata", "main"]);
    assert_eq!(read, written);
    assert_eq!(ManifestWriter::default().read_existing(&destination).unwrap(), written);
  }

  #[test]
  fn update_mode_keeps_entry_named_metadata() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let writer = ManifestWriter::new(WriterOptions {
      update_existing: true,
      ..WriterOptions::default()
    });

    writer
      .write(&manifest(&[("metadata", "js", "metadata.js")]), &destination)
      .unwrap();
    let result = writer
      .write(&manifest(&[("main", "js", "main.js")]), &destination)
      .unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), vec!["metadata", "main"]);
  }

  #[test]
  fn entry_colliding_with_metadata_key_is_rejected() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    let writer = ManifestWriter::new(WriterOptions {
      metadata: Some(json!({"v": 1})),
      ..WriterOptions::default()
    });

    let err = writer
      .write(&manifest(&[("metadata", "js", "metadata.js")]), &destination)
      .unwrap_err();

    assert!(matches!(err, ManifestError::ReservedEntryName { ref name } if name == "metadata"));
    assert!(!destination.exists());
  }

  #[test]
  fn unreadable_prior_file_is_reported_and_write_fails() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");
    fs::create_dir_all(&destination).unwrap();

    let err = read_manifest(&destination).unwrap_err();
    assert!(matches!(err, ManifestError::PriorManifestUnreadable { ref path, .. } if *path == destination));

    let writer = ManifestWriter::new(WriterOptions {
      update_existing: true,
      ..WriterOptions::default()
    });
    let err = writer
      .write(&manifest(&[("main", "js", "main.js")]), &destination)
      .unwrap_err();
    assert!(matches!(err, ManifestError::WriteFailure { .. }));
  }

  #[test]
  fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    assert!(read_manifest(&dir.path().join("absent.json")).unwrap().is_empty());
  }

  #[test]
  fn unwritable_destination_surfaces_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let err = ManifestWriter::default()
      .write(&manifest(&[("main", "js", "main.js")]), &blocker.join("assets.json"))
      .unwrap_err();

    assert!(matches!(err, ManifestError::WriteFailure { .. }));
  }

  #[test]
  fn leaves_no_temporary_files_behind() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("assets.json");

    ManifestWriter::default()
      .write(&manifest(&[("main", "js", "main.js")]), &destination)
      .unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
      .unwrap()
      .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
      .collect();
    assert_eq!(names, vec!["assets.json".to_string()]);
  }
}
