//! Manifest extraction and merging broken into focused submodules for easier testing.

mod collect;
mod merge;

pub use collect::{AssetCollector, CollectorOptions};
pub use merge::merge;
