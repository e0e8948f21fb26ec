// bsync-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod brew;
pub mod git;
pub mod manifest;
pub mod process;
pub mod reconcile;
pub mod resolve;

// Re-export key types for easier use by the CLI crate
pub use brew::{BrewBundle, PackageManager};
pub use git::{Git, VersionControl};
pub use reconcile::{diff_manifests, merge_diff};
pub use resolve::{Choice, InterruptSource, Outcome, ResolveOptions, Resolver};
