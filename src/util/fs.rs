//! Filesystem utilities.
//!
//! Every failure is reported as [`FreightError::Resource`] naming the
//! failed action and its path.

use std::fs;
use std::path::Path;

use crate::util::errors::{FreightError, Result};

/// Create a single directory readable only by its owner.
///
/// Parents must already exist and an existing directory is an error.
pub fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(path)
        .map_err(|e| FreightError::resource("create", path, e))
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| FreightError::resource("remove", path, e))?;
    }
    Ok(())
}

/// Write a string to a file, replacing any previous contents.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| FreightError::resource("write", path, e))
}
