//! Package manager backends.
//!
//! A backend owns one workspace and walks it through the build lifecycle:
//!
//! ```text
//! Uninitialized -> Initialized -> Staged -> SourceBuilt -> BinaryBuilt
//!        \______________\____________\__________\______-> Failed
//! ```
//!
//! Any real failure moves the backend to `Failed` and removes the workspace
//! before the error is returned. A successful binary build leaves the
//! workspace in place so the caller can collect artifacts from it.

pub mod registry;
pub mod rpm;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::{Manifest, Workspace};
use crate::util::errors::Result;

pub use registry::BackendRegistry;
pub use rpm::RpmBackend;

/// Identifier of a supported package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendId {
    #[default]
    Yum,
    Dnf,
}

impl BackendId {
    /// All backend IDs.
    pub const ALL: [BackendId; 2] = [BackendId::Yum, BackendId::Dnf];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Yum => "yum",
            BackendId::Dnf => "dnf",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yum" => Ok(BackendId::Yum),
            "dnf" => Ok(BackendId::Dnf),
            _ => Err(format!(
                "unknown backend '{}'; expected 'yum' or 'dnf'",
                s
            )),
        }
    }
}

/// Command-line contract of an rpm package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManager {
    /// Executable name
    pub program: &'static str,

    /// Exit code of `check-update` meaning "updates are available"
    pub updates_available_code: i32,
}

impl PackageManager {
    pub const YUM: PackageManager = PackageManager {
        program: "yum",
        updates_available_code: 100,
    };

    pub const DNF: PackageManager = PackageManager {
        program: "dnf",
        updates_available_code: 100,
    };

    /// The package manager driven by `id`.
    pub fn for_backend(id: BackendId) -> PackageManager {
        match id {
            BackendId::Yum => PackageManager::YUM,
            BackendId::Dnf => PackageManager::DNF,
        }
    }
}

/// Lifecycle state of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    Initialized,
    Staged,
    SourceBuilt,
    BinaryBuilt,
    Failed,
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendState::Uninitialized => "uninitialized",
            BackendState::Initialized => "initialized",
            BackendState::Staged => "staged",
            BackendState::SourceBuilt => "source-built",
            BackendState::BinaryBuilt => "binary-built",
            BackendState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of checking a built container for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrospectOutcome {
    /// Every installed package is current.
    UpToDate,
    /// The package manager reported pending updates.
    UpdatesAvailable,
}

/// Operations every package manager backend provides.
pub trait PackageBackend {
    /// Which package manager this backend drives.
    fn id(&self) -> BackendId;

    /// Current lifecycle state.
    fn state(&self) -> BackendState;

    /// The workspace, once initialized and until cleaned up.
    fn workspace(&self) -> Option<&Workspace>;

    /// Create the workspace.
    fn init(&mut self) -> Result<()>;

    /// Create the container tree, installer configuration and control file.
    fn stage(&mut self, manifest: &Manifest) -> Result<()>;

    /// Archive the staged tree and build the source package.
    ///
    /// Stages first if the backend is only initialized. Returns the path of
    /// the source package.
    fn build_source_artifact(&mut self, manifest: &Manifest) -> Result<PathBuf>;

    /// Rebuild the source package into the binary container package.
    ///
    /// Returns the directory the binary package was written to.
    fn build_binary_artifact(&mut self, manifest: &Manifest) -> Result<PathBuf>;

    /// Install `artifact` into a sandbox and check it for pending updates.
    fn introspect(&mut self, manifest: &Manifest, artifact: &Path) -> Result<IntrospectOutcome>;

    /// Remove the workspace. Safe to call at any time, any number of times.
    fn cleanup(&mut self) -> Result<()>;
}
