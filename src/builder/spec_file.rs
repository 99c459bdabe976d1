//! Generation of the rpmbuild control file.
//!
//! The generated spec unpacks the staged tree, lets the package manager
//! install the requested packages into `<name>/containerfs` inside the build
//! root, and then records every directory, file and symlink it finds so the
//! whole tree becomes the payload of the binary package.

use std::path::PathBuf;

use tracing::debug;

use crate::builder::backend::PackageManager;
use crate::core::manifest::Manifest;
use crate::core::workspace::Workspace;
use crate::util::errors::Result;
use crate::util::fs::write_string;

/// Placeholder `%description` body.
pub const DESCRIPTION: &str = "A container rpm for freight";

/// Space-separated package request list.
///
/// Every name is followed by exactly one space, in manifest order, with no
/// deduplication.
pub fn package_list(manifest: &Manifest) -> String {
    manifest.rpms().iter().map(|rpm| format!("{} ", rpm)).collect()
}

/// Path of the file list the `%install` script writes for `%files -f`.
pub fn file_list_path(manifest: &Manifest) -> String {
    format!("/tmp/{}.manifest", manifest.package.name)
}

/// Render the complete control file.
pub fn render(manifest: &Manifest, manager: &PackageManager) -> String {
    let pkg = &manifest.package;
    let tool = manager.program;
    let installroot = format!("${{RPM_BUILD_ROOT}}/{}/containerfs/", pkg.name);
    let file_list = file_list_path(manifest);

    let mut spec = String::new();

    // AutoReqProv is off so the container never satisfies host dependencies.
    spec.push_str(&format!(
        "Name: {name}\n\
         Version: {version}\n\
         Release: {release}\n\
         License: {license}\n\
         AutoReqProv: no\n\
         Summary: {summary}\n\
         Source0: {source}\n\
         \n\n",
        name = pkg.container_name(),
        version = pkg.version,
        release = pkg.release,
        license = pkg.license,
        summary = pkg.summary,
        source = pkg.tarball_name(),
    ));

    spec.push_str(&format!("BuildRequires: {}\n\n\n", tool));

    spec.push_str(&format!("%description\n{}\n\n\n", DESCRIPTION));

    spec.push_str("%install\n");
    spec.push_str("cd ${RPM_BUILD_ROOT}\n");
    spec.push_str("tar xvf %{SOURCE0}\n");
    spec.push_str(&format!(
        "{tool} -y --installroot={root}  --releasever={releasever} install {rpms}\n",
        tool = tool,
        root = installroot,
        releasever = manifest.manager.releasever,
        rpms = package_list(manifest),
    ));
    spec.push_str(&format!(
        "{} --installroot={} clean all\n",
        tool, installroot
    ));

    spec.push_str(&format!("rm -f {}\n", file_list));
    for (kind, entry) in [("d", "%dir /$i"), ("f", "/$i"), ("l", "/$i")] {
        spec.push_str(&format!(
            "for i in `find . -type {kind}`\n\
             do\n\
             \techo \"{entry}\" >> {file_list}\n\
             done\n",
            kind = kind,
            entry = entry,
            file_list = file_list,
        ));
    }

    spec.push_str(&format!("\n\n%files -f {}\n", file_list));
    spec.push_str("\n\n%changelog\n");

    spec
}

/// Write the control file to `<workspace>/<name>-freight-container.spec`.
pub fn write_spec_file(
    manifest: &Manifest,
    manager: &PackageManager,
    workspace: &Workspace,
) -> Result<PathBuf> {
    let path = workspace.spec_path(&manifest.package);
    debug!("writing control file {}", path.display());
    write_string(&path, &render(manifest, manager))?;
    Ok(path)
}
