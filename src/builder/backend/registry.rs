//! Backend registry - creates a fresh backend for each build lifecycle.
//!
//! Construction never fails and performs no I/O. Tool availability is
//! checked separately by [`crate::ops::preflight`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder::backend::rpm::RpmBackend;
use crate::builder::backend::{BackendId, PackageBackend};
use crate::util::process::SystemRunner;

/// Factory for package manager backends.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    work_root: PathBuf,
    timeout: Option<Duration>,
}

impl BackendRegistry {
    /// Backends created by this registry stage their workspace under `work_root`.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        BackendRegistry {
            work_root: work_root.into(),
            timeout: None,
        }
    }

    /// Bound every external command by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory new workspaces are created in.
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Create an uninitialized backend for `id`.
    pub fn create(&self, id: BackendId) -> Box<dyn PackageBackend> {
        let runner = SystemRunner::new().with_timeout(self.timeout);
        match id {
            BackendId::Yum | BackendId::Dnf => {
                Box::new(RpmBackend::with_runner(id, self.work_root.clone(), runner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::backend::BackendState;

    #[test]
    fn test_create_backends() {
        let registry = BackendRegistry::new("/tmp");

        for id in BackendId::ALL {
            let backend = registry.create(id);
            assert_eq!(backend.id(), id);
            assert_eq!(backend.state(), BackendState::Uninitialized);
            assert!(backend.workspace().is_none());
        }
    }

    #[test]
    fn test_registry_keeps_settings() {
        let registry =
            BackendRegistry::new("/var/tmp").with_timeout(Some(Duration::from_secs(30)));
        assert_eq!(registry.work_root(), Path::new("/var/tmp"));
        assert_eq!(registry.timeout, Some(Duration::from_secs(30)));
    }
}
