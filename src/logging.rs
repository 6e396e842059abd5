//! Logging setup for the `bundle-manifest` binary.
//!
//! The library only emits `tracing` events; embedders install their own subscriber.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log level for command line output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
  /// No logging output
  Silent,
  /// Only errors
  Error,
  /// Errors and warnings
  #[default]
  Warn,
  /// Errors, warnings, and info
  Info,
  /// All logs including debug
  Debug,
}

impl LogLevel {
  fn as_filter(&self) -> &'static str {
    match self {
      LogLevel::Silent => "off",
      LogLevel::Error => "error",
      LogLevel::Warn => "warn",
      LogLevel::Info => "info",
      LogLevel::Debug => "debug",
    }
  }
}

impl std::fmt::Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_filter())
  }
}

/// Install the global subscriber. `RUST_LOG` directives take precedence over `level`.
///
/// Only the first call in a process has an effect.
pub fn init_logging(level: LogLevel) {
  INIT.call_once(|| {
    let filter = EnvFilter::builder()
      .with_default_directive(
        level
          .as_filter()
          .parse()
          .unwrap_or_else(|_| tracing::level_filters::LevelFilter::WARN.into()),
      )
      .from_env_lossy();

    tracing_subscriber::registry()
      .with(filter)
      .with(fmt::layer().compact().with_target(false).without_time())
      .init();
  });
}
