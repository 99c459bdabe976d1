//! Implementation of `freight-builder introspect`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::builder::backend::{
    BackendId, BackendRegistry, IntrospectOutcome, PackageBackend, PackageManager,
};
use crate::core::Manifest;
use crate::ops::preflight::check_tools;
use crate::util::errors::Result;

/// Options for inspecting a built container.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Package manager backend
    pub backend: BackendId,

    /// Directory the sandbox workspace is created in
    pub work_root: PathBuf,

    /// Per-command timeout
    pub timeout: Option<Duration>,

    /// Check that the package manager is installed before starting
    pub preflight: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        IntrospectOptions {
            backend: BackendId::default(),
            work_root: PathBuf::from("."),
            timeout: None,
            preflight: true,
        }
    }
}

/// Check the container package at `artifact` for pending updates.
pub fn introspect(
    manifest: &Manifest,
    artifact: &Path,
    opts: &IntrospectOptions,
) -> Result<IntrospectOutcome> {
    if opts.preflight {
        check_tools(&[PackageManager::for_backend(opts.backend).program])?;
    }

    let registry = BackendRegistry::new(&opts.work_root).with_timeout(opts.timeout);
    let mut backend = registry.create(opts.backend);

    introspect_with(backend.as_mut(), manifest, artifact)
}

/// Initialize `backend`, run the update check and remove the sandbox.
pub fn introspect_with(
    backend: &mut dyn PackageBackend,
    manifest: &Manifest,
    artifact: &Path,
) -> Result<IntrospectOutcome> {
    backend.init()?;
    let outcome = backend.introspect(manifest, artifact)?;

    if let Err(e) = backend.cleanup() {
        warn!("could not remove introspection workspace: {}", e);
    }

    Ok(outcome)
}
