//! Network namespace syscalls.
//!
//! Namespace membership belongs to the calling OS thread, not the process,
//! so every path here is derived from the thread id.

use std::fs::File;
use std::os::fd::{AsFd, OwnedFd};
use std::path::{Path, PathBuf};

use edgenet_common::error::{EdgenetError, Result};

/// Returns the `/proc/<pid>/task/<tid>/ns/net` entry of the calling thread.
#[cfg(target_os = "linux")]
#[must_use]
pub fn current_thread_netns_path() -> PathBuf {
    use nix::unistd::{getpid, gettid};

    PathBuf::from(edgenet_common::constants::thread_netns_path(
        getpid().as_raw(),
        gettid().as_raw(),
    ))
}

/// Stub for non-Linux platforms; `/proc` layout is Linux specific.
#[cfg(not(target_os = "linux"))]
#[must_use]
pub fn current_thread_netns_path() -> PathBuf {
    PathBuf::from("/proc/self/ns/net")
}

/// Opens a namespace entry read-only. The descriptor is close-on-exec.
///
/// # Errors
///
/// Returns [`EdgenetError::Failed`] with the OS error text if the open fails.
pub fn open_namespace(path: &Path) -> Result<OwnedFd> {
    File::open(path)
        .map(OwnedFd::from)
        .map_err(|e| EdgenetError::failed("failed to open network namespace", e))
}

/// Returns the inode identifying the namespace behind a namespace entry.
///
/// Two entries refer to the same namespace iff their inodes are equal.
///
/// # Errors
///
/// Returns an error if the entry cannot be stat'ed.
pub fn namespace_id(path: &Path) -> Result<u64> {
    use std::os::unix::fs::MetadataExt;

    std::fs::metadata(path)
        .map(|m| m.ino())
        .map_err(|e| EdgenetError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Moves the calling thread into a new, empty network namespace.
///
/// # Errors
///
/// Returns an error if the `unshare(CLONE_NEWNET)` syscall fails.
#[cfg(target_os = "linux")]
pub fn create_network_namespace() -> Result<()> {
    use nix::sched::{CloneFlags, unshare};

    unshare(CloneFlags::CLONE_NEWNET)
        .map_err(|e| EdgenetError::failed("network namespace creation failed", e.desc()))?;
    tracing::debug!("network namespace created");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, network namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn create_network_namespace() -> Result<()> {
    Err(EdgenetError::Config {
        message: "Linux required for network namespaces".into(),
    })
}

/// Moves the calling thread into the network namespace behind `ns`.
///
/// # Errors
///
/// Returns an error if `setns(2)` fails.
#[cfg(target_os = "linux")]
pub fn join_network_namespace(ns: impl AsFd) -> Result<()> {
    use nix::sched::{CloneFlags, setns};

    setns(ns, CloneFlags::CLONE_NEWNET)
        .map_err(|e| EdgenetError::failed("setns network namespace failed", e.desc()))?;
    tracing::debug!("joined network namespace");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, namespace joining requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn join_network_namespace(_ns: impl AsFd) -> Result<()> {
    Err(EdgenetError::Config {
        message: "Linux required for network namespaces".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_path_names_this_task() {
        let path = current_thread_netns_path();
        let text = path.to_string_lossy();
        assert!(text.starts_with(&format!("/proc/{}/task/", std::process::id())));
        assert!(text.ends_with("/ns/net"));
    }

    #[test]
    fn thread_and_process_share_a_namespace_by_default() {
        let thread = namespace_id(&current_thread_netns_path()).unwrap();
        let process = namespace_id(Path::new("/proc/self/ns/net")).unwrap();
        assert_eq!(thread, process);
    }

    #[test]
    fn open_missing_entry_fails() {
        let err = open_namespace(Path::new("/proc/self/ns/does-not-exist")).unwrap_err();
        assert!(matches!(err, EdgenetError::Failed { .. }));
    }
}
