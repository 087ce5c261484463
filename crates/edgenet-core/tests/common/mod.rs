//! Shared doubles and helpers for the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use edgenet_common::config::NetworkConfig;
use edgenet_common::error::{EdgenetError, Result};
use edgenet_core::{InterfaceManager, NamespaceManager};

/// In-memory interface manager that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeInterfaces {
    pub brought_up: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
    pub fail_bring_up: bool,
}

impl FakeInterfaces {
    pub fn failing() -> Self {
        Self {
            fail_bring_up: true,
            ..Self::default()
        }
    }
}

impl InterfaceManager for FakeInterfaces {
    fn bring_up_interface(&self, name: &str) -> Result<()> {
        if self.fail_bring_up {
            return Err(EdgenetError::failed(
                "failed to get interface flags",
                "No such device",
            ));
        }
        self.brought_up.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn remove_interface(&self, name: &str) -> Result<()> {
        self.removed.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

/// Builds a manager rooted at `root`.
pub fn manager(root: &Path, interfaces: Arc<dyn InterfaceManager>) -> NamespaceManager {
    let config = NetworkConfig {
        netns_dir: root.to_path_buf(),
        ..NetworkConfig::default()
    };
    NamespaceManager::with_config(&config, interfaces).unwrap()
}

/// Returns a namespace name no other test run will use.
pub fn unique_name() -> String {
    format!("edgenet-test-{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Returns whether this process may create and bind-mount network namespaces.
///
/// Probes with a real create/delete on a scratch thread, so a sandbox that
/// denies `unshare` or `mount` even to root is detected.
pub fn can_manage_namespaces() -> bool {
    if !nix::unistd::geteuid().is_root() {
        return false;
    }
    std::thread::spawn(|| {
        let Ok(dir) = tempfile::tempdir() else {
            return false;
        };
        let mgr = manager(dir.path(), Arc::new(FakeInterfaces::default()));
        let name = unique_name();
        let created = mgr.create_network_namespace(&name).is_ok();
        let _ = mgr.delete_network_namespace(&name);
        created
    })
    .join()
    .unwrap_or(false)
}
