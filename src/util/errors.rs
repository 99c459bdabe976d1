//! Error types for freight operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::builder::backend::BackendState;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, FreightError>;

/// Error raised while staging or building a container artifact.
#[derive(Debug, Error)]
pub enum FreightError {
    /// A filesystem operation on a workspace path failed.
    #[error("cannot {action} `{}`", path.display())]
    Resource {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An external tool could not be started.
    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// An external tool ran but reported failure.
    #[error("`{command}` failed with {}", describe_code(*code))]
    Tool { command: String, code: Option<i32> },

    /// An external tool did not finish within the configured timeout.
    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// Operation called out of order.
    #[error("cannot {operation} while the backend is {state}")]
    InvalidState {
        operation: &'static str,
        state: BackendState,
    },

    /// Manifest content that cannot be safely turned into files or commands.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// The artifact's file name does not carry the container suffix.
    #[error("`{}` is not a freight container artifact", .0.display())]
    InvalidArtifact(PathBuf),

    /// Required tools are not on PATH.
    #[error("required tools not found in PATH: {}", .0.join(", "))]
    MissingTools(Vec<String>),
}

impl FreightError {
    /// Wrap an I/O error from `action` on `path` as a resource error.
    pub fn resource(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        FreightError::Resource {
            action,
            path: path.into(),
            source,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_message() {
        let err = FreightError::Tool {
            command: "rpmbuild -bs foo.spec".to_string(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "`rpmbuild -bs foo.spec` failed with exit code 1"
        );

        let err = FreightError::Tool {
            command: "yum check-update".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_resource_error_keeps_source() {
        use std::error::Error as _;

        let err = FreightError::resource(
            "create",
            "/nonexistent/dir",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(err.to_string(), "cannot create `/nonexistent/dir`");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("No such file or directory".to_string())
        );
    }

    #[test]
    fn test_missing_tools_lists_all() {
        let err = FreightError::MissingTools(vec!["rpmbuild".into(), "yum".into()]);
        assert_eq!(
            err.to_string(),
            "required tools not found in PATH: rpmbuild, yum"
        );
    }
}
