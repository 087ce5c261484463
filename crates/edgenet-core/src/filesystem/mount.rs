//! Bind mount and lazy unmount of namespace handle files.

use std::path::Path;

use edgenet_common::error::{EdgenetError, Result};

/// Creates a bind mount from source to target.
///
/// Used to pin a `/proc/.../ns/net` entry onto a handle file so the
/// namespace outlives the thread that created it.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn bind_mount(source: &Path, target: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some(source),
        target,
        Some("none"),
        MsFlags::MS_BIND,
        None::<&str>,
    )
    .map_err(|e| EdgenetError::failed("bind mount failed", e.desc()))?;

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "bind mount created"
    );
    Ok(())
}

/// Unmounts the given path with `MNT_DETACH`.
///
/// The mount disappears from the tree immediately; the namespace itself
/// lives on while other processes still reference it.
///
/// # Errors
///
/// Returns an error if the unmount syscall fails.
#[cfg(target_os = "linux")]
pub fn unmount_detached(target: &Path) -> Result<()> {
    nix::mount::umount2(target, nix::mount::MntFlags::MNT_DETACH)
        .map_err(|e| EdgenetError::failed("failed to unmount namespace", e.desc()))?;
    tracing::debug!(path = %target.display(), "unmounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, bind mounts of namespace entries require Linux.
#[cfg(not(target_os = "linux"))]
pub fn bind_mount(_source: &Path, _target: &Path) -> Result<()> {
    Err(EdgenetError::Config {
        message: "Linux required for namespace handles".into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, namespace handles require Linux.
#[cfg(not(target_os = "linux"))]
pub fn unmount_detached(_target: &Path) -> Result<()> {
    Err(EdgenetError::Config {
        message: "Linux required for namespace handles".into(),
    })
}
