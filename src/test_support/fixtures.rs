//! Test fixtures for common test scenarios.

use crate::core::manifest::{
    BuildOpts, ManagerOpts, Manifest, PackageInfo, PackageList, Repository,
};

/// The reference manifest: package `foo` 1.0-1 from one repository.
pub fn sample_manifest() -> Manifest {
    Manifest {
        package: PackageInfo {
            name: "foo".to_string(),
            version: "1.0".to_string(),
            release: "1".to_string(),
            license: "GPL".to_string(),
            summary: "s".to_string(),
        },
        repos: vec![Repository {
            name: "base".to_string(),
            url: "http://x".to_string(),
        }],
        packages: PackageList {
            rpms: vec!["bash".to_string(), "coreutils".to_string()],
        },
        manager: ManagerOpts {
            releasever: "30".to_string(),
        },
        opts: BuildOpts::default(),
    }
}

/// TOML text of [`sample_manifest`].
pub const SAMPLE_MANIFEST_TOML: &str = r#"[package]
name = "foo"
version = "1.0"
release = "1"
license = "GPL"
summary = "s"

[[repository]]
name = "base"
url = "http://x"

[packages]
rpms = ["bash", "coreutils"]

[yum]
releasever = "30"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_toml_matches_sample_manifest() {
        let parsed = Manifest::parse(SAMPLE_MANIFEST_TOML).unwrap();
        assert_eq!(parsed, sample_manifest());
    }
}
