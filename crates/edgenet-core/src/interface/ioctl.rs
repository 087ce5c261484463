//! Interface flag control through `SIOCGIFFLAGS`/`SIOCSIFFLAGS`.

use edgenet_common::constants::IFNAMSIZ;
use edgenet_common::error::{EdgenetError, Result};

use super::check_ifname;

/// The flags view of `struct ifreq`.
///
/// The kernel reads and writes `sizeof(struct ifreq)` bytes, which is 40 on
/// 64-bit targets: a 16-byte name followed by a 24-byte union.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IfreqFlags {
    /// NUL-terminated interface name.
    pub name: [libc::c_char; IFNAMSIZ],
    /// Interface flags (`ifr_flags`).
    pub flags: libc::c_short,
    pad: [u8; 22],
}

impl IfreqFlags {
    /// Builds a request for the named interface with zeroed flags.
    ///
    /// Names longer than `IFNAMSIZ - 1` bytes are truncated, matching what
    /// the kernel would see through `strncpy`.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn new(ifname: &str) -> Self {
        let mut name = [0 as libc::c_char; IFNAMSIZ];
        for (dst, src) in name.iter_mut().zip(ifname.bytes().take(IFNAMSIZ - 1)) {
            *dst = src as libc::c_char;
        }
        Self {
            name,
            flags: 0,
            pad: [0; 22],
        }
    }

    /// Returns the name bytes up to (not including) the terminator.
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub fn name_bytes(&self) -> Vec<u8> {
        self.name
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect()
    }
}

/// Returns `flags` with `IFF_UP` and `IFF_RUNNING` set.
///
/// Setting the bits is idempotent; every other bit is preserved.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn with_up_flags(flags: libc::c_short) -> libc::c_short {
    flags | (libc::IFF_UP | libc::IFF_RUNNING) as libc::c_short
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
mod sys {
    use super::IfreqFlags;

    nix::ioctl_readwrite_bad!(
        /// Reads interface flags into the request.
        get_flags,
        libc::SIOCGIFFLAGS,
        IfreqFlags
    );
    nix::ioctl_write_ptr_bad!(
        /// Writes interface flags from the request.
        set_flags,
        libc::SIOCSIFFLAGS,
        IfreqFlags
    );
}

/// Opens the datagram socket the interface ioctls are issued on.
#[cfg(target_os = "linux")]
fn control_socket() -> Result<std::os::fd::OwnedFd> {
    use nix::sys::socket::{AddressFamily, SockFlag, SockType, socket};

    socket(
        AddressFamily::Inet,
        SockType::Datagram,
        SockFlag::SOCK_CLOEXEC,
        None,
    )
    .map_err(|e| EdgenetError::failed("failed to create ioctl socket", e.desc()))
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
fn read_flags(sock: &std::os::fd::OwnedFd, ifname: &str) -> Result<IfreqFlags> {
    use std::os::fd::AsRawFd;

    let mut request = IfreqFlags::new(ifname);
    // SAFETY: `sock` is an open socket and `request` is a live, correctly
    // sized `struct ifreq` for the duration of the call.
    unsafe { sys::get_flags(sock.as_raw_fd(), &mut request) }
        .map_err(|e| EdgenetError::failed("failed to get interface flags", e.desc()))?;
    Ok(request)
}

/// Reads the current flags of an interface.
///
/// # Errors
///
/// Returns [`EdgenetError::InvalidName`] for an empty name or one with a NUL
/// byte, and [`EdgenetError::Failed`] with the OS error text if the socket
/// cannot be created or the ioctl fails.
#[cfg(target_os = "linux")]
pub fn interface_flags(ifname: &str) -> Result<libc::c_short> {
    check_ifname(ifname)?;
    let sock = control_socket()?;
    Ok(read_flags(&sock, ifname)?.flags)
}

/// Brings an interface up in the calling thread's network namespace.
///
/// # Errors
///
/// Returns [`EdgenetError::InvalidName`] for an empty name or one with a NUL
/// byte, before any syscall. Returns [`EdgenetError::Failed`] with the OS
/// error text if the control socket cannot be created or either ioctl fails.
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub fn bring_up(ifname: &str) -> Result<()> {
    use std::os::fd::AsRawFd;

    check_ifname(ifname)?;
    let sock = control_socket()?;

    let mut request = read_flags(&sock, ifname)?;
    request.flags = with_up_flags(request.flags);

    // SAFETY: as in `read_flags`; the kernel only reads from `request`.
    unsafe { sys::set_flags(sock.as_raw_fd(), &request) }
        .map_err(|e| EdgenetError::failed("failed to set interface flags", e.desc()))?;

    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, interface control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn interface_flags(_ifname: &str) -> Result<libc::c_short> {
    Err(EdgenetError::Config {
        message: "Linux required for interface control".into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, interface control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn bring_up(ifname: &str) -> Result<()> {
    check_ifname(ifname)?;
    Err(EdgenetError::Config {
        message: "Linux required for interface control".into(),
    })
}
