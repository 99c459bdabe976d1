//! Workspace - the temporary directory tree one build is staged in.
//!
//! A workspace is created with a unique name under a parent directory,
//! owned by exactly one backend, and removed again by [`Workspace::cleanup`].
//! Layout:
//!
//! ```text
//! <root>/
//!   <name>/containerfs/{etc/yum.repos.d, etc/yum.conf, cache, logs}
//!   <name>-freight.tbz2
//!   <name>-freight-container.spec
//!   introspect/<name>/containerfs/
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::manifest::PackageInfo;
use crate::util::errors::{FreightError, Result};
use crate::util::fs::{create_private_dir, remove_dir_all_if_exists};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "freight-builder.";

/// A uniquely named working directory for a single build.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Create a new uniquely named workspace directory under `parent`.
    pub fn init(parent: &Path) -> Result<Self> {
        let parent = if parent.is_absolute() {
            parent.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| FreightError::resource("resolve", parent, e))?
                .join(parent)
        };

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .rand_bytes(6)
            .disable_cleanup(true)
            .tempdir_in(&parent)
            .map_err(|e| {
                let template = parent.join(format!("{}XXXXXX", WORKSPACE_PREFIX));
                FreightError::resource("create", template, e)
            })?;

        let root = dir.path().to_path_buf();
        debug!("created workspace {}", root.display());

        Ok(Workspace {
            root,
            removed: false,
        })
    }

    /// Absolute path of the workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join the workspace root, an optional prefix segment and a relative path.
    pub fn join(&self, relative: &str, prefix: Option<&str>) -> PathBuf {
        let mut path = self.root.clone();
        if let Some(prefix) = prefix {
            path.push(prefix);
        }
        let relative = relative.trim_start_matches('/');
        if !relative.is_empty() {
            path.push(relative);
        }
        path
    }

    /// Create the directory `<root>/<prefix>/<relative>`, owner-only.
    ///
    /// The directory must not exist yet.
    pub fn make_path(&self, relative: &str, prefix: Option<&str>) -> Result<PathBuf> {
        let path = self.join(relative, prefix);
        debug!("building path {}", path.display());
        create_private_dir(&path)?;
        Ok(path)
    }

    /// `<root>/<name>/containerfs`
    pub fn containerfs(&self, pkg: &PackageInfo) -> PathBuf {
        self.join("containerfs", Some(&pkg.name))
    }

    /// `<root>/<name>-freight-container.spec`
    pub fn spec_path(&self, pkg: &PackageInfo) -> PathBuf {
        self.root.join(pkg.spec_file_name())
    }

    /// `<root>/<name>-freight.tbz2`
    pub fn tarball_path(&self, pkg: &PackageInfo) -> PathBuf {
        self.root.join(pkg.tarball_name())
    }

    /// Whether [`Workspace::cleanup`] already ran.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Recursively delete the workspace. Calling it again is a no-op.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }
        debug!("removing workspace {}", self.root.display());
        remove_dir_all_if_exists(&self.root)?;
        self.removed = true;
        Ok(())
    }
}
