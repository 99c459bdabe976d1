//! rpm backend shared by the yum and dnf package managers.
//!
//! Staging writes the container tree and control file into the workspace;
//! the package builder (`rpmbuild`) then turns that into a source package
//! and rebuilds it into the binary container package. The package manager
//! itself only runs inside the generated `%install` script and during
//! introspection.

use std::error::Error as _;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::builder::backend::{
    BackendId, BackendState, IntrospectOutcome, PackageBackend, PackageManager,
};
use crate::builder::repo_config::write_repo_configs;
use crate::builder::spec_file::write_spec_file;
use crate::core::manifest::{is_token, Manifest, CONTAINER_SUFFIX};
use crate::core::Workspace;
use crate::util::errors::{FreightError, Result};
use crate::util::process::{CommandRunner, ProcessBuilder, SystemRunner};

/// Package builder executable.
pub const RPMBUILD: &str = "rpmbuild";

/// Archiver used for the staged tree.
pub const TAR: &str = "tar";

/// Directories created under `<workspace>/<name>/`, parents first.
const STAGED_DIRS: [&str; 6] = [
    "",
    "containerfs",
    "containerfs/etc",
    "containerfs/etc/yum.repos.d",
    "containerfs/cache",
    "containerfs/logs",
];

/// Backend driving `rpmbuild` and an rpm package manager.
#[derive(Debug)]
pub struct RpmBackend<R: CommandRunner = SystemRunner> {
    id: BackendId,
    manager: PackageManager,
    runner: R,
    work_root: PathBuf,
    workspace: Option<Workspace>,
    state: BackendState,
}

impl RpmBackend<SystemRunner> {
    /// Create a backend whose workspace will live under `work_root`.
    pub fn new(id: BackendId, work_root: impl Into<PathBuf>) -> Self {
        Self::with_runner(id, work_root, SystemRunner::new())
    }
}

impl<R: CommandRunner> RpmBackend<R> {
    /// Create a backend that executes tools through `runner`.
    pub fn with_runner(id: BackendId, work_root: impl Into<PathBuf>, runner: R) -> Self {
        RpmBackend {
            id,
            manager: PackageManager::for_backend(id),
            runner,
            work_root: work_root.into(),
            workspace: None,
            state: BackendState::Uninitialized,
        }
    }

    /// The package manager this backend drives.
    pub fn manager(&self) -> &PackageManager {
        &self.manager
    }

    /// The command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn require(&self, operation: &'static str, allowed: &[BackendState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(FreightError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn ws(&self, operation: &'static str) -> Result<&Workspace> {
        self.workspace.as_ref().ok_or(FreightError::InvalidState {
            operation,
            state: self.state,
        })
    }

    /// Run one lifecycle step. A failing step marks the backend failed and
    /// removes the workspace before the error is handed back.
    fn guarded<T>(&mut self, step: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                error!("{} failed: {}", step, describe(&err));
                self.state = BackendState::Failed;
                if let Err(cleanup_err) = self.remove_workspace() {
                    warn!("could not remove workspace: {}", describe(&cleanup_err));
                }
                Err(err)
            }
        }
    }

    fn remove_workspace(&mut self) -> Result<()> {
        if let Some(ws) = self.workspace.as_mut() {
            ws.cleanup()?;
        }
        self.workspace = None;
        Ok(())
    }

    fn run_checked(&mut self, cmd: &ProcessBuilder, echo: bool) -> Result<()> {
        let result = self.runner.run(cmd, echo)?;
        if result.success() {
            Ok(())
        } else {
            Err(FreightError::Tool {
                command: cmd.display_command(),
                code: result.code,
            })
        }
    }

    fn stage_workdir(&self, manifest: &Manifest) -> Result<()> {
        manifest.validate()?;

        let ws = self.ws("stage")?;
        let name = manifest.package.name.as_str();
        info!("initializing work directory {}", ws.root().display());

        for dir in STAGED_DIRS {
            ws.make_path(dir, Some(name))?;
        }

        write_repo_configs(manifest, &ws.containerfs(&manifest.package))?;
        write_spec_file(manifest, &self.manager, ws)?;

        Ok(())
    }

    fn build_srpm(&mut self, manifest: &Manifest) -> Result<PathBuf> {
        let (archive, rpmbuild, srpm) = {
            let ws = self.ws("build the source package")?;
            let out = output_dir(manifest, ws);
            (
                archive_command(ws, manifest),
                srpm_command(ws, manifest, &out),
                out.join(manifest.package.srpm_file_name()),
            )
        };

        let verbose = manifest.opts.verbose;
        info!("creating {} configuration archive", self.manager.program);
        self.run_checked(&archive, verbose)?;

        info!("building container source rpm");
        self.run_checked(&rpmbuild, verbose)?;

        Ok(srpm)
    }

    fn build_rpm(&mut self, manifest: &Manifest) -> Result<PathBuf> {
        let out = output_dir(manifest, self.ws("build the binary package")?);
        let rebuild = rpm_command(manifest, &out);

        info!("building container binary rpm");
        self.run_checked(&rebuild, manifest.opts.verbose)?;

        Ok(out)
    }

    fn inspect(&mut self, manifest: &Manifest, artifact: &Path) -> Result<IntrospectOutcome> {
        let container = container_name_from_artifact(artifact)?;
        manifest.validate()?;

        let sandbox = self.ws("introspect")?.make_path("introspect", None)?;

        info!("unpacking container {}", artifact.display());
        let install = install_command(
            &self.manager,
            &sandbox,
            &manifest.manager.releasever,
            artifact,
        );
        self.run_checked(&install, manifest.opts.verbose)?;

        info!("container name is {}", container);
        let root = sandbox.join(&container).join("containerfs");
        let check = check_update_command(&self.manager, &root);

        info!("looking for packages requiring update");
        let result = self.runner.run(&check, true)?;
        match result.code {
            Some(0) => {
                info!("all packages up to date");
                Ok(IntrospectOutcome::UpToDate)
            }
            Some(code) if code == self.manager.updates_available_code => {
                info!("updates are available for {}", container);
                Ok(IntrospectOutcome::UpdatesAvailable)
            }
            code => Err(FreightError::Tool {
                command: check.display_command(),
                code,
            }),
        }
    }
}

impl<R: CommandRunner> PackageBackend for RpmBackend<R> {
    fn id(&self) -> BackendId {
        self.id
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    fn init(&mut self) -> Result<()> {
        self.require("initialize", &[BackendState::Uninitialized])?;

        let work_root = self.work_root.clone();
        let ws = self.guarded("creating work directory", |_| Workspace::init(&work_root))?;
        self.workspace = Some(ws);
        self.state = BackendState::Initialized;
        Ok(())
    }

    fn stage(&mut self, manifest: &Manifest) -> Result<()> {
        self.require("stage", &[BackendState::Initialized])?;

        self.guarded("staging work directory", |this| this.stage_workdir(manifest))?;
        self.state = BackendState::Staged;
        Ok(())
    }

    fn build_source_artifact(&mut self, manifest: &Manifest) -> Result<PathBuf> {
        self.require(
            "build the source package",
            &[BackendState::Initialized, BackendState::Staged],
        )?;

        if self.state == BackendState::Initialized {
            self.stage(manifest)?;
        }

        let srpm = self.guarded("building source rpm", |this| this.build_srpm(manifest))?;
        self.state = BackendState::SourceBuilt;
        Ok(srpm)
    }

    fn build_binary_artifact(&mut self, manifest: &Manifest) -> Result<PathBuf> {
        self.require("build the binary package", &[BackendState::SourceBuilt])?;

        let out = self.guarded("building binary rpm", |this| this.build_rpm(manifest))?;
        self.state = BackendState::BinaryBuilt;
        Ok(out)
    }

    fn introspect(&mut self, manifest: &Manifest, artifact: &Path) -> Result<IntrospectOutcome> {
        self.require(
            "introspect",
            &[
                BackendState::Initialized,
                BackendState::Staged,
                BackendState::SourceBuilt,
                BackendState::BinaryBuilt,
            ],
        )?;

        self.guarded("introspecting container", |this| {
            this.inspect(manifest, artifact)
        })
    }

    fn cleanup(&mut self) -> Result<()> {
        self.remove_workspace()?;
        if self.state != BackendState::Failed {
            self.state = BackendState::Uninitialized;
        }
        Ok(())
    }
}

/// Where artifacts are written: the manifest's output path or the workspace.
pub fn output_dir(manifest: &Manifest, ws: &Workspace) -> PathBuf {
    manifest
        .opts
        .output_path
        .clone()
        .unwrap_or_else(|| ws.root().to_path_buf())
}

/// `tar -C <ws> -jcf <ws>/<name>-freight.tbz2 ./<name>/`
pub fn archive_command(ws: &Workspace, manifest: &Manifest) -> ProcessBuilder {
    ProcessBuilder::new(TAR)
        .arg("-C")
        .arg(ws.root())
        .arg("-jcf")
        .arg(ws.tarball_path(&manifest.package))
        .arg(format!("./{}/", manifest.package.name))
}

/// `rpmbuild -D "_sourcedir <ws>" -D "_srcrpmdir <out>" -bs <spec>`
pub fn srpm_command(ws: &Workspace, manifest: &Manifest, out: &Path) -> ProcessBuilder {
    ProcessBuilder::new(RPMBUILD)
        .arg("-D")
        .arg(format!("_sourcedir {}", ws.root().display()))
        .arg("-D")
        .arg(format!("_srcrpmdir {}", out.display()))
        .arg("-bs")
        .arg(ws.spec_path(&manifest.package))
}

/// Rebuild `<out>/<srpm>` into `<out>`, naming the binary package
/// `<name>-freight-container-<version>-<release>.<arch>.rpm`.
pub fn rpm_command(manifest: &Manifest, out: &Path) -> ProcessBuilder {
    let pkg = &manifest.package;
    let mut cmd = ProcessBuilder::new(RPMBUILD);
    if !manifest.opts.verbose {
        cmd = cmd.arg("--quiet");
    }
    cmd.arg("-D")
        .arg(format!("_build_name_fmt {}%%{{ARCH}}.rpm", pkg.rpm_file_prefix()))
        .arg("-D")
        .arg("__arch_install_post /usr/lib/rpm/check-rpaths /usr/lib/rpm/check-buildroot")
        .arg("-D")
        .arg(format!("_rpmdir {}", out.display()))
        .arg("--rebuild")
        .arg(out.join(pkg.srpm_file_name()))
}

/// Install a container package into the sandbox root.
pub fn install_command(
    manager: &PackageManager,
    sandbox: &Path,
    releasever: &str,
    artifact: &Path,
) -> ProcessBuilder {
    ProcessBuilder::new(manager.program)
        .arg(format!("--installroot={}", sandbox.display()))
        .arg("-y")
        .arg("--nogpgcheck")
        .arg(format!("--releasever={}", releasever))
        .arg("install")
        .arg(artifact)
}

/// Check the installed container root for pending updates.
pub fn check_update_command(manager: &PackageManager, root: &Path) -> ProcessBuilder {
    ProcessBuilder::new(manager.program)
        .arg(format!("--installroot={}/", root.display()))
        .arg("--nogpgcheck")
        .arg("check-update")
}

/// Container name encoded in an artifact's file name: everything before
/// the first `-freight-container`. The name becomes a sandbox path segment,
/// so it must be a plain token.
pub fn container_name_from_artifact(artifact: &Path) -> Result<String> {
    artifact
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.find(CONTAINER_SUFFIX).map(|idx| &name[..idx]))
        .filter(|name| is_token(name))
        .map(str::to_string)
        .ok_or_else(|| FreightError::InvalidArtifact(artifact.to_path_buf()))
}

fn describe(err: &FreightError) -> String {
    match err.source() {
        Some(source) => format!("{}: {}", err, source),
        None => err.to_string(),
    }
}
