//! Helpers for classifying and resolving the paths a bundler emitted.
//!
//! Classification, URL detection and public path handling live in focused submodules so each
//! rule can be tested on its own. The collector combines them when building entry manifests.

mod classify;
mod filters;
mod public;

pub use classify::{AssetKind, classify, other_extension, strip_query};
pub use filters::is_url_like;
pub(crate) use public::interpolate_hash;
pub use public::{interpolate_public_path, resolve_public_path};
