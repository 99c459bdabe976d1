//! Installer configuration staged into the container tree.
//!
//! Each manifest repository becomes `etc/yum.repos.d/<name>-fb.repo`, and a
//! single `etc/yum.conf` points the installer at the container-local cache,
//! log and repository directories.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::manifest::{Manifest, Repository};
use crate::util::errors::Result;
use crate::util::fs::write_string;

/// Suffix distinguishing freight-generated repository ids.
pub const REPO_ID_SUFFIX: &str = "-fb";

/// Global installer configuration written to `etc/yum.conf`.
pub const MAIN_CONFIG: &str = "[main]\n\
cachedir=/cache\n\
keepcache=1\n\
logfile=/logs/yum.log\n\
reposdir=/etc/yum.repos.d/\n";

/// Repository id used in the section header and the `name=` field.
pub fn repo_id(repo: &Repository) -> String {
    format!("{}{}", repo.name, REPO_ID_SUFFIX)
}

/// Render the repository definition file for `repo`.
pub fn render_repo_file(repo: &Repository) -> String {
    let id = repo_id(repo);
    format!(
        "[{id}]\n\
         name={id}\n\
         baseurl={url}\n\
         gpgcheck=0\n\
         enabled=1\n",
        id = id,
        url = repo.url,
    )
}

/// Write one repository file per manifest repository, in manifest order,
/// followed by the global configuration file.
///
/// `containerfs` must already contain `etc/yum.repos.d`. Returns the written
/// paths with the global configuration last.
pub fn write_repo_configs(manifest: &Manifest, containerfs: &Path) -> Result<Vec<PathBuf>> {
    let repos_dir = containerfs.join("etc").join("yum.repos.d");
    let mut written = Vec::with_capacity(manifest.repos.len() + 1);

    for repo in &manifest.repos {
        let path = repos_dir.join(format!("{}.repo", repo_id(repo)));
        debug!("writing repository {} to {}", repo.name, path.display());
        write_string(&path, &render_repo_file(repo))?;
        written.push(path);
    }

    let conf = containerfs.join("etc").join("yum.conf");
    debug!("writing installer configuration {}", conf.display());
    write_string(&conf, MAIN_CONFIG)?;
    written.push(conf);

    Ok(written)
}
