//! Container manifest schema.
//!
//! The manifest describes what goes into a container artifact: the package
//! identity, the repositories to install from, the packages to install and
//! a few build options. It is immutable input to the build backends.
//!
//! ```toml
//! [package]
//! name = "web"
//! version = "1.0"
//! release = "1"
//! license = "GPL"
//! summary = "A web server container"
//!
//! [[repository]]
//! name = "base"
//! url = "http://mirror.example.com/fedora/30/x86_64/os/"
//!
//! [packages]
//! rpms = ["bash", "httpd"]
//!
//! [yum]
//! releasever = "30"
//!
//! [options]
//! verbose = false
//! output_path = "/srv/freight"
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::errors::FreightError;

/// Suffix appended to the package name to form the container package name.
pub const CONTAINER_SUFFIX: &str = "-freight-container";

/// Names, versions and package identifiers end up as path segments, rpm tags
/// and package-manager arguments. Restrict them to a conservative set that
/// cannot start an option or carry shell or macro syntax.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._+-]*$").expect("valid regex"));

/// Container package identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub release: String,
    pub license: String,
    pub summary: String,
}

impl PackageInfo {
    /// Name of the generated package: `<name>-freight-container`.
    pub fn container_name(&self) -> String {
        format!("{}{}", self.name, CONTAINER_SUFFIX)
    }

    /// File name of the staged-tree archive used as `Source0`.
    pub fn tarball_name(&self) -> String {
        format!("{}-freight.tbz2", self.name)
    }

    /// File name of the generated control file.
    pub fn spec_file_name(&self) -> String {
        format!("{}.spec", self.container_name())
    }

    /// File name of the source artifact produced by the package builder.
    pub fn srpm_file_name(&self) -> String {
        format!(
            "{}-{}-{}.src.rpm",
            self.container_name(),
            self.version,
            self.release
        )
    }

    /// Prefix of the binary artifact's file name; the architecture and the
    /// `.rpm` extension follow it.
    pub fn rpm_file_prefix(&self) -> String {
        format!("{}-{}-{}.", self.container_name(), self.version, self.release)
    }
}

/// A package repository the container installs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
}

/// Packages requested for the container, in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageList {
    #[serde(default)]
    pub rpms: Vec<String>,
}

/// Build options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOpts {
    /// Echo external tool output
    pub verbose: bool,

    /// Directory receiving the built artifacts (default: the workspace)
    pub output_path: Option<PathBuf>,
}

/// Package manager options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerOpts {
    pub releasever: String,
}

/// A container manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageInfo,

    #[serde(default, rename = "repository")]
    pub repos: Vec<Repository>,

    #[serde(default)]
    pub packages: PackageList,

    #[serde(rename = "yum")]
    pub manager: ManagerOpts,

    #[serde(default, rename = "options")]
    pub opts: BuildOpts,
}

impl Manifest {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse a manifest from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Requested package names in manifest order.
    pub fn rpms(&self) -> &[String] {
        &self.packages.rpms
    }

    /// Check that every manifest-supplied string is safe to place in paths,
    /// control-file tags and tool arguments.
    pub fn validate(&self) -> std::result::Result<(), FreightError> {
        let pkg = &self.package;
        check_token("package name", &pkg.name)?;
        check_token("package version", &pkg.version)?;
        check_token("package release", &pkg.release)?;
        check_line("license", &pkg.license)?;
        check_line("summary", &pkg.summary)?;
        check_token("releasever", &self.manager.releasever)?;

        for repo in &self.repos {
            check_token("repository name", &repo.name)?;
            check_url(&repo.name, &repo.url)?;
        }

        for rpm in self.rpms() {
            check_token("package", rpm)?;
        }

        Ok(())
    }
}

/// Whether `value` is a plain name safe to use as a path segment or tool
/// argument.
pub(crate) fn is_token(value: &str) -> bool {
    TOKEN_RE.is_match(value)
}

fn check_token(what: &str, value: &str) -> std::result::Result<(), FreightError> {
    if is_token(value) {
        Ok(())
    } else {
        Err(FreightError::Manifest(format!(
            "{} `{}` may only contain letters, digits, `.`, `_`, `+` and `-`",
            what, value
        )))
    }
}

fn check_line(what: &str, value: &str) -> std::result::Result<(), FreightError> {
    if value.trim().is_empty() {
        return Err(FreightError::Manifest(format!("{} is empty", what)));
    }
    if value.chars().any(char::is_control) {
        return Err(FreightError::Manifest(format!(
            "{} must be a single line",
            what
        )));
    }
    // `%` starts an rpm macro, including `%(...)` shell expansion.
    if value.contains('%') {
        return Err(FreightError::Manifest(format!(
            "{} must not contain `%`",
            what
        )));
    }
    Ok(())
}

fn check_url(repo: &str, value: &str) -> std::result::Result<(), FreightError> {
    // Url::parse silently strips tabs and newlines, so look at the raw text first.
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(FreightError::Manifest(format!(
            "url of repository `{}` contains whitespace",
            repo
        )));
    }
    Url::parse(value).map_err(|e| {
        FreightError::Manifest(format!(
            "url of repository `{}` is not valid: {}",
            repo, e
        ))
    })?;
    Ok(())
}
