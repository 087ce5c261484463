//! Unified error types for the edgenet workspace.
//!
//! Every syscall, ioctl, netlink, or external command failure is converted
//! into [`EdgenetError::Failed`] at the point where it happens. Filesystem
//! errors on a known path keep that path in [`EdgenetError::Io`].

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum EdgenetError {
    /// A kernel call or external tool failed.
    #[error("{message}")]
    Failed {
        /// Human-readable cause, usually the OS error text or exit status.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A namespace or interface name cannot be used.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl EdgenetError {
    /// Builds a [`EdgenetError::Failed`] from a context string and a cause.
    pub fn failed(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::Failed {
            message: format!("{context}: {cause}"),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, EdgenetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_joins_context_and_cause() {
        let err = EdgenetError::failed("failed to get interface flags", "No such device");
        assert_eq!(
            err.to_string(),
            "failed to get interface flags: No such device"
        );
    }

    #[test]
    fn invalid_name_quotes_the_name() {
        let err = EdgenetError::InvalidName {
            name: "a/b".into(),
            reason: "must be a single path component",
        };
        assert_eq!(
            err.to_string(),
            "invalid name \"a/b\": must be a single path component"
        );
    }
}
