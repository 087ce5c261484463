//! Persistent network namespaces addressed by name.
//!
//! A namespace is provisioned iff `<root>/<name>` exists and is a bind mount
//! of a network namespace entry. The filesystem is the only source of truth:
//! nothing is cached, so a restarted process sees exactly what the kernel has.

pub mod network;

use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use edgenet_common::config::NetworkConfig;
use edgenet_common::error::{EdgenetError, Result};
use edgenet_common::types::{NamespaceName, NamespaceState};

use crate::filesystem::mount;
use crate::interface::InterfaceManager;

/// Pins a namespace entry (first path) onto a handle file (second path).
type BindFn = fn(&Path, &Path) -> Result<()>;

/// Creates, locates, and deletes named network namespaces.
///
/// Creation temporarily moves the *calling thread* into the new namespace.
/// Callers must not run other namespace-changing code on the same thread
/// concurrently; dedicate a thread to it or serialize calls.
pub struct NamespaceManager {
    root: PathBuf,
    loopback: String,
    interfaces: Arc<dyn InterfaceManager>,
    bind: BindFn,
}

impl NamespaceManager {
    /// Creates a manager rooted at `/run/netns`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new(interfaces: Arc<dyn InterfaceManager>) -> Result<Self> {
        Self::with_config(&NetworkConfig::default(), interfaces)
    }

    /// Creates a manager using the configured root directory and loopback name.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn with_config(
        config: &NetworkConfig,
        interfaces: Arc<dyn InterfaceManager>,
    ) -> Result<Self> {
        tracing::debug!(root = %config.netns_dir.display(), "init namespace manager");
        std::fs::create_dir_all(&config.netns_dir).map_err(|e| EdgenetError::Io {
            path: config.netns_dir.clone(),
            source: e,
        })?;
        Ok(Self {
            root: config.netns_dir.clone(),
            loopback: config.loopback.clone(),
            interfaces,
            bind: mount::bind_mount,
        })
    }

    /// Returns the directory holding the handle files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the handle path for a namespace. Performs no syscalls.
    #[must_use]
    pub fn network_namespace_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Reports whether a handle file exists for the namespace.
    #[must_use]
    pub fn namespace_state(&self, name: &str) -> NamespaceState {
        if self.network_namespace_path(name).exists() {
            NamespaceState::Provisioned
        } else {
            NamespaceState::Absent
        }
    }

    /// Lists the names of all handle files, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be read.
    pub fn list_network_namespaces(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.root).map_err(|e| EdgenetError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EdgenetError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Creates a network namespace and pins it at its handle path.
    ///
    /// Succeeds immediately if the handle already exists. On any failure
    /// after the handle file is created, the file is removed. On every exit
    /// path the calling thread is returned to the namespace it started in.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, or if opening the original
    /// namespace, `unshare`, creating the handle file, the bind mount, or
    /// bringing up loopback fails.
    pub fn create_network_namespace(&self, name: &str) -> Result<()> {
        let name = NamespaceName::new(name)?;
        tracing::debug!(ns = %name, "creating network namespace");

        let path = self.network_namespace_path(name.as_str());
        if path.exists() {
            tracing::debug!(ns = %name, "network namespace already exists");
            return Ok(());
        }

        let original = network::open_namespace(&network::current_thread_netns_path())?;

        network::create_network_namespace()?;

        let mut guard = match create_handle_file(&path) {
            Ok(()) => ReturnGuard::new(original, &path),
            Err(e) => {
                // Nothing to clean up yet, only the thread needs to go back.
                return_to(&original);
                return Err(e);
            }
        };

        (self.bind)(&network::current_thread_netns_path(), &path)?;
        guard.mounted = true;

        self.interfaces.bring_up_interface(&self.loopback)?;

        guard.committed = true;
        drop(guard);

        tracing::info!(ns = %name, path = %path.display(), "network namespace created");
        Ok(())
    }

    /// Unmounts and removes a namespace handle.
    ///
    /// Succeeds without side effects if the handle does not exist. Both the
    /// unmount and the removal are attempted even if the first fails; the
    /// first error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or either step fails.
    pub fn delete_network_namespace(&self, name: &str) -> Result<()> {
        let name = NamespaceName::new(name)?;
        tracing::debug!(ns = %name, "deleting network namespace");

        let path = self.network_namespace_path(name.as_str());
        if !path.exists() {
            return Ok(());
        }

        let unmounted = mount::unmount_detached(&path);
        if let Err(e) = &unmounted {
            tracing::error!(ns = %name, error = %e, "failed to unmount namespace");
        }

        let removed = std::fs::remove_file(&path)
            .map_err(|e| EdgenetError::failed("failed to remove namespace file", e));
        if let Err(e) = &removed {
            tracing::error!(ns = %name, error = %e, "failed to remove namespace file");
        }

        unmounted.and(removed)?;
        tracing::info!(ns = %name, "network namespace deleted");
        Ok(())
    }
}

/// Creates the empty handle file, failing if it already exists.
fn create_handle_file(path: &Path) -> Result<()> {
    std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .mode(0o444)
        .open(path)
        .map(drop)
        .map_err(|e| EdgenetError::failed("failed to create namespace file", e))
}

/// Best-effort return of the calling thread to `original`.
fn return_to(original: &OwnedFd) {
    if let Err(e) = network::join_network_namespace(original) {
        tracing::error!(error = %e, "failed to return to original namespace");
    }
}

/// Returns the thread to its original namespace when dropped, and removes the
/// handle file unless creation was committed.
struct ReturnGuard<'a> {
    original: OwnedFd,
    handle: &'a Path,
    mounted: bool,
    committed: bool,
}

impl<'a> ReturnGuard<'a> {
    fn new(original: OwnedFd, handle: &'a Path) -> Self {
        Self {
            original,
            handle,
            mounted: false,
            committed: false,
        }
    }
}

impl Drop for ReturnGuard<'_> {
    fn drop(&mut self) {
        return_to(&self.original);

        if self.committed {
            return;
        }

        tracing::error!(path = %self.handle.display(), "network namespace creation failed, cleaning up");
        // A mounted handle cannot be unlinked.
        if self.mounted {
            if let Err(e) = mount::unmount_detached(self.handle) {
                tracing::error!(error = %e, "failed to unmount namespace file");
            }
        }
        if let Err(e) = std::fs::remove_file(self.handle) {
            tracing::error!(error = %e, "failed to remove namespace file");
        }
    }
}
