// bsync-common/src/model/mod.rs
pub mod bundle;
pub mod manifest;

// Re-export
pub use bundle::{BundleType, ManifestEntry};
pub use manifest::{DiffResult, Manifest, SENTINEL_CATEGORY};
