//! Implementation of `freight-builder build`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::builder::backend::{BackendId, BackendRegistry, PackageBackend};
use crate::core::Manifest;
use crate::ops::preflight::preflight;
use crate::util::errors::Result;

/// Options for building a container.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Package manager backend
    pub backend: BackendId,

    /// Directory the workspace is created in
    pub work_root: PathBuf,

    /// Per-command timeout
    pub timeout: Option<Duration>,

    /// Keep the workspace after a successful build
    pub keep_workspace: bool,

    /// Check that the required tools are installed before starting
    pub preflight: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            backend: BackendId::default(),
            work_root: PathBuf::from("."),
            timeout: None,
            keep_workspace: false,
            preflight: true,
        }
    }
}

/// Artifacts produced by a build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The source package
    pub srpm: PathBuf,

    /// Directory holding the binary package
    pub rpm_dir: PathBuf,

    /// The binary package, if it could be located in `rpm_dir`
    pub rpm: Option<PathBuf>,

    /// The workspace, when it was kept
    pub workspace: Option<PathBuf>,
}

/// Build the container described by `manifest` with a fresh backend.
pub fn build(manifest: &Manifest, opts: &BuildOptions) -> Result<BuildResult> {
    if opts.preflight {
        preflight(opts.backend)?;
    }

    let registry = BackendRegistry::new(&opts.work_root).with_timeout(opts.timeout);
    let mut backend = registry.create(opts.backend);

    build_with(backend.as_mut(), manifest, opts.keep_workspace)
}

/// Drive `backend` through init, stage, source build and binary build.
///
/// Artifacts written into the workspace (no output path in the manifest)
/// would be lost by cleanup, so in that case the workspace is always kept.
pub fn build_with(
    backend: &mut dyn PackageBackend,
    manifest: &Manifest,
    keep_workspace: bool,
) -> Result<BuildResult> {
    info!(
        "building {} with {}",
        manifest.package.container_name(),
        backend.id()
    );

    backend.init()?;
    backend.stage(manifest)?;
    let srpm = backend.build_source_artifact(manifest)?;
    let rpm_dir = backend.build_binary_artifact(manifest)?;
    let rpm = locate_binary_artifact(&rpm_dir, manifest);

    let keep = keep_workspace || manifest.opts.output_path.is_none();
    let workspace = if keep {
        backend.workspace().map(|ws| ws.root().to_path_buf())
    } else {
        if let Err(e) = backend.cleanup() {
            warn!("could not remove workspace: {}", e);
        }
        None
    };

    Ok(BuildResult {
        srpm,
        rpm_dir,
        rpm,
        workspace,
    })
}

/// Find `<name>-freight-container-<version>-<release>.<arch>.rpm` in `dir`.
pub fn locate_binary_artifact(dir: &Path, manifest: &Manifest) -> Option<PathBuf> {
    let prefix = manifest.package.rpm_file_prefix();
    let entries = fs::read_dir(dir).ok()?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| {
                    name.starts_with(&prefix)
                        && name.ends_with(".rpm")
                        && !name.ends_with(".src.rpm")
                })
                .unwrap_or(false)
        })
        .collect();

    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::backend::{BackendState, RpmBackend};
    use crate::test_support::{sample_manifest, MockRunner};
    use crate::util::errors::FreightError;
    use crate::util::process::CommandResult;
    use tempfile::TempDir;

    #[test]
    fn test_build_runs_full_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut manifest = sample_manifest();
        manifest.opts.output_path = Some(out.path().to_path_buf());
        fs::write(
            out.path().join("foo-freight-container-1.0-1.x86_64.rpm"),
            b"",
        )
        .unwrap();

        let mut backend = RpmBackend::with_runner(BackendId::Yum, tmp.path(), MockRunner::new());
        let result = build_with(&mut backend, &manifest, false).unwrap();

        assert_eq!(
            result.srpm,
            out.path().join("foo-freight-container-1.0-1.src.rpm")
        );
        assert_eq!(result.rpm_dir, out.path());
        assert_eq!(
            result.rpm,
            Some(out.path().join("foo-freight-container-1.0-1.x86_64.rpm"))
        );
        assert!(result.workspace.is_none());
        assert_eq!(backend.runner().calls().len(), 3);
        assert_eq!(backend.state(), BackendState::Uninitialized);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_build_without_output_path_keeps_workspace() {
        let tmp = TempDir::new().unwrap();
        let manifest = sample_manifest();

        let mut backend = RpmBackend::with_runner(BackendId::Yum, tmp.path(), MockRunner::new());
        let result = build_with(&mut backend, &manifest, false).unwrap();

        let ws = result.workspace.unwrap();
        assert!(ws.is_dir());
        assert_eq!(result.rpm_dir, ws);
        assert_eq!(backend.state(), BackendState::BinaryBuilt);
    }

    #[test]
    fn test_build_failure_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let mut runner = MockRunner::new();
        runner.respond("--rebuild", CommandResult::exited(1));

        let mut backend = RpmBackend::with_runner(BackendId::Yum, tmp.path(), runner);
        let err = build_with(&mut backend, &sample_manifest(), true).unwrap_err();

        assert!(matches!(err, FreightError::Tool { .. }));
        assert_eq!(backend.state(), BackendState::Failed);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_locate_binary_artifact_ignores_srpm() {
        let tmp = TempDir::new().unwrap();
        let manifest = sample_manifest();
        fs::write(tmp.path().join("foo-freight-container-1.0-1.src.rpm"), b"").unwrap();
        assert!(locate_binary_artifact(tmp.path(), &manifest).is_none());

        fs::write(tmp.path().join("foo-freight-container-1.0-1.noarch.rpm"), b"").unwrap();
        assert_eq!(
            locate_binary_artifact(tmp.path(), &manifest),
            Some(tmp.path().join("foo-freight-container-1.0-1.noarch.rpm"))
        );
    }
}
