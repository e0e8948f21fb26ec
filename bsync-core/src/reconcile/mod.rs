// bsync-core/src/reconcile/mod.rs
pub mod diff;
pub mod merge;

pub use diff::diff_manifests;
pub use merge::merge_diff;
