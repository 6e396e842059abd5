//! Adapter between the bundler's completion hook and the manifest pipeline.

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::auxiliary::AuxiliaryAssetProvider;
use crate::config::PluginConfig;
use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{AssetCollector, merge};
use crate::models::{CompilationResult, Manifest, MultiCompilationBatch};
use crate::writer::ManifestWriter;

#[derive(Debug, Default)]
enum Slot {
  #[default]
  Pending,
  Collected(Manifest),
  Failed,
}

/// Completion barrier for one build: one slot per expected compilation.
#[derive(Debug)]
struct BatchState {
  slots: Vec<Slot>,
  remaining: usize,
}

impl BatchState {
  fn new(expected: usize) -> Self {
    Self {
      slots: (0..expected).map(|_| Slot::Pending).collect(),
      remaining: expected,
    }
  }

  /// Fill `index`, returning `true` when this arrival completed the batch.
  fn fill(&mut self, index: usize, slot: Slot) -> bool {
    let previous = std::mem::replace(&mut self.slots[index], slot);
    if matches!(previous, Slot::Pending) {
      self.remaining -= 1;
    }
    self.remaining == 0
  }

  /// Take the completed slots and reset the barrier for the next build.
  fn drain(&mut self) -> Vec<Slot> {
    let expected = self.slots.len();
    std::mem::replace(self, Self::new(expected)).slots
  }
}

/// Receives compilation results from the bundler and writes the manifest once a build is done.
///
/// Results are collected as they arrive and buffered in their declaration slot. When the last
/// expected compilation reports, the slots are merged in declaration order and written, so
/// completion order never affects the output. In incremental mode each compilation is written
/// as it arrives through the update-existing path instead, serialised by the internal lock.
pub struct ManifestPlugin {
  config: PluginConfig,
  collector: AssetCollector,
  writer: ManifestWriter,
  state: Mutex<BatchState>,
}

impl ManifestPlugin {
  /// Plugin expecting `expected_compilations` results per build (at least one).
  pub fn new(config: PluginConfig, expected_compilations: usize) -> Self {
    let expected = expected_compilations.max(1);
    if expected > 1 && !config.multi_compiler {
      debug!(expected, "several compilations expected; merging them into one manifest");
    }

    Self {
      collector: AssetCollector::new(config.collector_options()),
      writer: ManifestWriter::new(config.writer_options()),
      state: Mutex::new(BatchState::new(expected)),
      config,
    }
  }

  /// Register an additional auxiliary asset provider, e.g. a stylesheet extraction step.
  pub fn with_provider(mut self, provider: impl AuxiliaryAssetProvider + 'static) -> Self {
    self.collector = self.collector.with_provider(provider);
    self
  }

  /// Configuration this plugin was created with.
  pub fn config(&self) -> &PluginConfig {
    &self.config
  }

  /// Number of compilations expected per build.
  pub fn expected_compilations(&self) -> usize {
    self.state.lock().slots.len()
  }

  /// Completion hook for the compilation declared at position `index`.
  ///
  /// Returns the manifest written by this call, or `None` while the batch is still waiting
  /// for other compilations. A compilation reporting errors yields
  /// [`ManifestError::CompilationFailed`], and a batch containing one is never written.
  pub fn compilation_done(
    &self,
    index: usize,
    result: CompilationResult,
  ) -> ManifestResult<Option<Manifest>> {
    let expected = self.expected_compilations();
    if index >= expected {
      return Err(ManifestError::UnknownCompilation { index, expected });
    }

    let name = result.display_name(index);
    let slot = if result.has_errors {
      warn!(compilation = %name, "compilation reported errors, skipping manifest");
      Slot::Failed
    } else {
      let manifest = self.collector.collect(&result);
      debug!(compilation = %name, entries = manifest.len(), "collected compilation");
      Slot::Collected(manifest)
    };

    let failed_here = matches!(slot, Slot::Failed);
    let mut state = self.state.lock();

    let mut written = None;
    if self.config.writes_incrementally() {
      if let Slot::Collected(manifest) = &slot {
        match self.writer.write(manifest, &self.config.destination()) {
          Ok(manifest) => written = Some(manifest),
          Err(err) => {
            warn!(compilation = %name, error = %err, "incremental write failed");
            if state.fill(index, Slot::Failed) {
              state.drain();
            }
            return Err(err);
          }
        }
      }
    }

    if !state.fill(index, slot) {
      return if failed_here {
        Err(ManifestError::CompilationFailed { compilation: name })
      } else {
        Ok(written)
      };
    }

    let slots = state.drain();
    let failed = slots
      .iter()
      .filter(|slot| matches!(slot, Slot::Failed))
      .count();

    if failed_here {
      return Err(ManifestError::CompilationFailed { compilation: name });
    }
    if failed > 0 {
      return Err(ManifestError::BatchFailed { failed });
    }
    if written.is_some() {
      return Ok(written);
    }

    let manifests = slots.into_iter().filter_map(|slot| match slot {
      Slot::Collected(manifest) => Some(manifest),
      Slot::Pending | Slot::Failed => None,
    });
    let merged = merge(manifests);
    self
      .writer
      .write(&merged, &self.config.destination())
      .map(Some)
  }

  /// Feed a whole batch in declaration order.
  ///
  /// Every compilation is reported even after a failure; the first error is returned.
  pub fn run_batch(&self, batch: MultiCompilationBatch) -> ManifestResult<Option<Manifest>> {
    let mut first_error = None;
    let mut written = None;

    for (index, result) in batch.into_iter().enumerate() {
      match self.compilation_done(index, result) {
        Ok(Some(manifest)) => written = Some(manifest),
        Ok(None) => {}
        Err(err) => {
          first_error.get_or_insert(err);
        }
      }
    }

    match first_error {
      Some(err) => Err(err),
      None => Ok(written),
    }
  }
}
