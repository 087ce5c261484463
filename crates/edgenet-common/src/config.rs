//! Configuration model for the edgenet primitives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EdgenetError, Result};

/// Root configuration shared by the namespace manager and the iptables facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Directory holding namespace handle files.
    pub netns_dir: PathBuf,
    /// Firewall tool to invoke, either a bare name resolved via `PATH` or an absolute path.
    pub iptables_binary: String,
    /// Table targeted when a caller does not name one.
    pub default_table: String,
    /// Interface brought up inside each new namespace.
    pub loopback: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            netns_dir: PathBuf::from(crate::constants::NETNS_DIR),
            iptables_binary: crate::constants::IPTABLES_BINARY.to_string(),
            default_table: crate::constants::DEFAULT_TABLE.to_string(),
            loopback: crate::constants::LOOPBACK_INTERFACE.to_string(),
        }
    }
}

impl NetworkConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// contains empty values.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| EdgenetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that no field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EdgenetError::Config`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        let empty = if self.netns_dir.as_os_str().is_empty() {
            Some("netns_dir")
        } else if self.iptables_binary.is_empty() {
            Some("iptables_binary")
        } else if self.default_table.is_empty() {
            Some("default_table")
        } else if self.loopback.is_empty() {
            Some("loopback")
        } else {
            None
        };
        match empty {
            Some(field) => Err(EdgenetError::Config {
                message: format!("{field} must not be empty"),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ip_netns_layout() {
        let config = NetworkConfig::default();
        assert_eq!(config.netns_dir, PathBuf::from("/run/netns"));
        assert_eq!(config.default_table, "filter");
        assert_eq!(config.loopback, "lo");
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgenet.json");
        std::fs::write(&path, r#"{ "netns_dir": "/tmp/netns" }"#).unwrap();

        let config = NetworkConfig::load(&path).unwrap();
        assert_eq!(config.netns_dir, PathBuf::from("/tmp/netns"));
        assert_eq!(config.iptables_binary, "iptables");
    }

    #[test]
    fn load_rejects_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgenet.json");
        std::fs::write(&path, r#"{ "default_table": "" }"#).unwrap();

        let err = NetworkConfig::load(&path).unwrap_err();
        assert!(matches!(err, EdgenetError::Config { .. }));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let err = NetworkConfig::load(Path::new("/nonexistent/edgenet.json")).unwrap_err();
        assert!(matches!(err, EdgenetError::Io { .. }));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgenet.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = NetworkConfig::load(&path).unwrap_err();
        assert!(matches!(err, EdgenetError::Serialization { .. }));
    }
}
