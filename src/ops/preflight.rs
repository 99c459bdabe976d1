//! Tool availability checks run before a build starts.

use tracing::debug;

use crate::builder::backend::rpm::{RPMBUILD, TAR};
use crate::builder::backend::{BackendId, PackageManager};
use crate::util::errors::{FreightError, Result};
use crate::util::process::find_executable;

/// External tools a backend needs on PATH.
pub fn required_tools(id: BackendId) -> Vec<&'static str> {
    vec![TAR, RPMBUILD, PackageManager::for_backend(id).program]
}

/// Fail with every missing tool listed, not only the first.
pub fn check_tools(tools: &[&str]) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|tool| {
            let found = find_executable(tool);
            debug!("{} -> {:?}", tool, found);
            found.is_none()
        })
        .map(|tool| tool.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FreightError::MissingTools(missing))
    }
}

/// Check that everything `id` invokes is installed.
pub fn preflight(id: BackendId) -> Result<()> {
    check_tools(&required_tools(id))
}
