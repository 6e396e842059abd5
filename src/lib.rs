#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod auxiliary;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod plugin;
pub mod writer;

pub use asset_paths::{AssetKind, classify};
pub use auxiliary::{AuxiliaryAssetProvider, EmbeddedAuxiliaryAssets, ExtractedStylesheets};
pub use config::PluginConfig;
pub use error::{ManifestError, ManifestResult};
pub use manifest::{AssetCollector, CollectorOptions, merge};
pub use models::{
  AuxiliaryAsset, ChunkGroup, CompilationResult, EntryManifest, Manifest, MultiCompilationBatch,
};
pub use plugin::ManifestPlugin;
pub use writer::{ManifestWriter, WriterOptions, read_manifest};
