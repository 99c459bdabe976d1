//! Container build machinery.
//!
//! - [`repo_config`] writes the installer configuration into the staged tree
//! - [`spec_file`] generates the package builder's control file
//! - [`backend`] sequences the external tools into a build lifecycle

pub mod backend;
pub mod repo_config;
pub mod spec_file;

pub use backend::{
    BackendId, BackendRegistry, BackendState, IntrospectOutcome, PackageBackend, PackageManager,
    RpmBackend,
};
