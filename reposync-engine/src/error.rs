//! Error types for reposync-engine.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while mirroring a single pair.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The external program could not be started at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran past its deadline and was killed.
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// A git command exited unsuccessfully. `message` is already redacted.
    #[error("git {operation} failed: {message}")]
    Git { operation: String, message: String },

    /// The mirror workspace could not be created or accessed.
    #[error("workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`EngineError::Workspace`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Workspace {
        path: path.into(),
        source,
    }
}

pub(crate) fn git_err(operation: impl Into<String>, stderr: &str) -> EngineError {
    let message = stderr.trim();
    EngineError::Git {
        operation: operation.into(),
        message: if message.is_empty() {
            "no output".to_string()
        } else {
            message.to_string()
        },
    }
}
