//! Domain primitive types used across the edgenet workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EdgenetError, Result};

/// Name of a network namespace handle under the namespace root directory.
///
/// A valid name is exactly one path component, so joining it onto the root
/// never escapes that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Validates and wraps a namespace name.
    ///
    /// # Errors
    ///
    /// Returns [`EdgenetError::InvalidName`] if the name is empty, `.`, `..`,
    /// or contains `/` or a NUL byte.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name == "." || name == ".." {
            Some("must not be a relative directory reference")
        } else if name.contains('/') {
            Some("must be a single path component")
        } else if name.contains('\0') {
            Some("must not contain NUL bytes")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(EdgenetError::InvalidName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable state of a namespace handle.
///
/// Provisioning is transient and confined to the creating thread, so only
/// the two settled states are ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamespaceState {
    /// No handle file exists.
    Absent,
    /// A handle file exists and is bind-mounted onto a namespace.
    Provisioned,
}

impl fmt::Display for NamespaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Provisioned => write!(f, "provisioned"),
        }
    }
}
