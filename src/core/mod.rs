//! Core data types.

pub mod manifest;
pub mod workspace;

pub use manifest::{BuildOpts, ManagerOpts, Manifest, PackageInfo, PackageList, Repository};
pub use workspace::Workspace;
