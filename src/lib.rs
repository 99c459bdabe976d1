//! freight - container root filesystems packaged as RPMs
//!
//! This crate stages a declared set of packages into a workspace, generates
//! the rpmbuild control file that installs them into a container tree, and
//! drives `rpmbuild` and the package manager to produce source and binary
//! container packages. Built containers can later be introspected for
//! pending updates.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for freight unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock command runner and manifest fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BackendId, BackendRegistry, BackendState, IntrospectOutcome, PackageBackend};
pub use crate::core::{manifest::Manifest, workspace::Workspace};
pub use util::errors::{FreightError, Result};
