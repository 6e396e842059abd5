//! Command line entry point: turn serialized compilation results into a manifest file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bundle_manifest::logging::{LogLevel, init_logging};
use bundle_manifest::{CompilationResult, ManifestPlugin, PluginConfig};
use clap::Parser;

/// Generate an entry-point asset manifest from bundler compilation results.
#[derive(Debug, Parser)]
#[command(name = "bundle-manifest", version, about)]
struct Cli {
  /// Compilation result JSON files, one per compiler, in declaration order.
  #[arg(required = true)]
  stats: Vec<PathBuf>,

  /// Configuration file; defaults to `bundle-manifest.config.json` in the working directory.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Destination directory.
  #[arg(long)]
  path: Option<String>,

  /// Manifest file name.
  #[arg(long)]
  filename: Option<String>,

  /// Merge into the existing manifest instead of overwriting it.
  #[arg(long)]
  update: bool,

  /// Indent the JSON output.
  #[arg(long)]
  pretty: bool,

  /// Record other file kinds keyed by extension.
  #[arg(long)]
  include_other: bool,

  /// Logging verbosity; `RUST_LOG` overrides it.
  #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
  log_level: LogLevel,
}

impl Cli {
  fn resolve_config(&self) -> Result<PluginConfig> {
    let mut config = match &self.config {
      Some(path) => PluginConfig::from_path(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?,
      None => PluginConfig::discover(Path::new(".")),
    };

    if let Some(path) = &self.path {
      config.path = path.clone();
    }
    if let Some(filename) = &self.filename {
      config.filename = filename.clone();
    }
    config.update |= self.update;
    config.pretty_print |= self.pretty;
    config.include_other |= self.include_other;
    config.multi_compiler |= self.stats.len() > 1;

    Ok(config)
  }
}

fn load_compilation(path: &Path) -> Result<CompilationResult> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("compilation result not found at {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse compilation result {}", path.display()))
}

fn run(cli: &Cli) -> Result<()> {
  let config = cli.resolve_config()?;
  let destination = config.destination();

  let batch = cli
    .stats
    .iter()
    .map(|path| load_compilation(path))
    .collect::<Result<Vec<_>>>()?;

  let plugin = ManifestPlugin::new(config, batch.len());
  let written = plugin
    .run_batch(batch)
    .context("manifest generation failed")?;

  if let Some(manifest) = written {
    println!(
      "wrote {} entries to {}",
      manifest.len(),
      destination.display()
    );
  }
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.log_level);

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}
