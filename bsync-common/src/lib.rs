// bsync-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{BsyncError, Result};
pub use model::{BundleType, DiffResult, Manifest, ManifestEntry, SENTINEL_CATEGORY};
