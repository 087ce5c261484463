//! Network interface control.
//!
//! Two point-in-time operations on the interfaces visible to the calling
//! thread's network namespace: raising administrative state through the
//! `SIOCGIFFLAGS`/`SIOCSIFFLAGS` ioctls, and removing a link through a
//! one-shot `RTM_DELLINK` netlink request.

pub mod ioctl;
pub mod netlink;

use edgenet_common::error::{EdgenetError, Result};

/// Rejects names that cannot identify any interface.
///
/// The kernel reads names as C strings, so a name with an embedded NUL
/// would silently address the interface named by its prefix.
pub(crate) fn check_ifname(ifname: &str) -> Result<()> {
    let reason = if ifname.is_empty() {
        "must not be empty"
    } else if ifname.contains('\0') {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };
    Err(EdgenetError::InvalidName {
        name: ifname.to_string(),
        reason,
    })
}

/// Interface operations consumed by the namespace manager and by policy code.
///
/// Implementors act on the network namespace of the calling thread.
pub trait InterfaceManager: Send + Sync {
    /// Sets the `IFF_UP` and `IFF_RUNNING` flags on an interface.
    ///
    /// # Errors
    ///
    /// Returns [`EdgenetError::InvalidName`] for an empty name or one with a
    /// NUL byte. Returns an error carrying the OS error text if the control socket
    /// cannot be opened or either ioctl fails (for example, the interface
    /// does not exist).
    fn bring_up_interface(&self, name: &str) -> Result<()>;

    /// Asks the kernel to delete an interface.
    ///
    /// Success means the request was accepted by the netlink socket, not
    /// that the link is gone; no acknowledgement is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the netlink socket cannot be opened or the
    /// request cannot be sent.
    fn remove_interface(&self, name: &str) -> Result<()>;
}

/// Production [`InterfaceManager`] backed by ioctls and raw netlink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkInterfaceManager;

impl NetworkInterfaceManager {
    /// Creates a new interface manager.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InterfaceManager for NetworkInterfaceManager {
    fn bring_up_interface(&self, name: &str) -> Result<()> {
        tracing::debug!(ifname = name, "bringing up interface");
        ioctl::bring_up(name)?;
        tracing::info!(ifname = name, "interface up");
        Ok(())
    }

    fn remove_interface(&self, name: &str) -> Result<()> {
        tracing::debug!(ifname = name, "removing interface");
        netlink::send_dellink(name)?;
        tracing::info!(ifname = name, "interface removal requested");
        Ok(())
    }
}
