//! One-shot `RTM_DELLINK` requests over `NETLINK_ROUTE`.
//!
//! The request is written and never acknowledged: the socket is closed as
//! soon as `send(2)` returns, so an asynchronous kernel failure (for example
//! a name that does not exist) is not observable here.

use std::mem;

use edgenet_common::constants::IFNAMSIZ;
use edgenet_common::error::{EdgenetError, Result};

use super::check_ifname;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const RTM_DELLINK: u16 = libc::RTM_DELLINK as u16;
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const NLM_F_REQUEST: u16 = libc::NLM_F_REQUEST as u16;
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const IFLA_IFNAME: u16 = libc::IFLA_IFNAME as u16;
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const AF_UNSPEC: u8 = libc::AF_UNSPEC as u8;

/// Netlink message header (`struct nlmsghdr`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct NlMsgHdr {
    nlmsg_len: u32,
    nlmsg_type: u16,
    nlmsg_flags: u16,
    nlmsg_seq: u32,
    nlmsg_pid: u32,
}

impl NlMsgHdr {
    fn write(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.nlmsg_len.to_ne_bytes());
        buf[4..6].copy_from_slice(&self.nlmsg_type.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.nlmsg_flags.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.nlmsg_seq.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.nlmsg_pid.to_ne_bytes());
    }
}

/// Interface info message (`struct ifinfomsg`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct IfInfoMsg {
    ifi_family: u8,
    ifi_pad: u8,
    ifi_type: u16,
    ifi_index: i32,
    ifi_flags: u32,
    ifi_change: u32,
}

impl IfInfoMsg {
    fn append(&self, msg: &mut Vec<u8>) {
        msg.push(self.ifi_family);
        msg.push(self.ifi_pad);
        msg.extend_from_slice(&self.ifi_type.to_ne_bytes());
        msg.extend_from_slice(&self.ifi_index.to_ne_bytes());
        msg.extend_from_slice(&self.ifi_flags.to_ne_bytes());
        msg.extend_from_slice(&self.ifi_change.to_ne_bytes());
    }
}

/// Netlink attribute header (`struct rtattr`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct NlAttr {
    nla_len: u16,
    nla_type: u16,
}

/// Rounds up to the 4-byte netlink alignment.
const fn align(len: usize) -> usize {
    (len + 3) & !3
}

/// Appends a NUL-terminated string attribute, padded to alignment.
///
/// `nla_len` covers header, value and terminator but not the padding.
#[allow(clippy::cast_possible_truncation)]
fn add_attr_string(msg: &mut Vec<u8>, attr_type: u16, value: &str) {
    let attr_len = mem::size_of::<NlAttr>() + value.len() + 1;
    let attr = NlAttr {
        nla_len: attr_len as u16,
        nla_type: attr_type,
    };
    msg.extend_from_slice(&attr.nla_len.to_ne_bytes());
    msg.extend_from_slice(&attr.nla_type.to_ne_bytes());
    msg.extend_from_slice(value.as_bytes());
    msg.push(0);
    msg.resize(msg.len() + align(attr_len) - attr_len, 0);
}

/// Encodes an `RTM_DELLINK` request naming the interface.
///
/// Layout: `nlmsghdr`, a zeroed `ifinfomsg` with family `AF_UNSPEC`, then a
/// single `IFLA_IFNAME` attribute holding the NUL-terminated name.
///
/// # Errors
///
/// Returns [`EdgenetError::InvalidName`] if the name is empty, contains a
/// NUL byte, or does not fit in `IFNAMSIZ`.
#[allow(clippy::cast_possible_truncation)]
pub fn dellink_request(ifname: &str) -> Result<Vec<u8>> {
    check_ifname(ifname)?;
    if ifname.len() >= IFNAMSIZ {
        return Err(EdgenetError::InvalidName {
            name: ifname.to_string(),
            reason: "exceeds the kernel interface name limit",
        });
    }

    let mut msg = Vec::with_capacity(64);

    // Header is written last, once the length is known.
    msg.resize(mem::size_of::<NlMsgHdr>(), 0);

    let ifinfo = IfInfoMsg {
        ifi_family: AF_UNSPEC,
        ifi_pad: 0,
        ifi_type: 0,
        ifi_index: 0,
        ifi_flags: 0,
        ifi_change: 0,
    };
    ifinfo.append(&mut msg);

    add_attr_string(&mut msg, IFLA_IFNAME, ifname);

    let hdr = NlMsgHdr {
        nlmsg_len: msg.len() as u32,
        nlmsg_type: RTM_DELLINK,
        nlmsg_flags: NLM_F_REQUEST,
        nlmsg_seq: 0,
        nlmsg_pid: 0,
    };
    hdr.write(&mut msg[..mem::size_of::<NlMsgHdr>()]);
    Ok(msg)
}

/// Sends an `RTM_DELLINK` request for the interface without waiting for a reply.
///
/// # Errors
///
/// Returns an error if the name is unusable, the netlink socket cannot be
/// created, or `send(2)` fails.
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub fn send_dellink(ifname: &str) -> Result<()> {
    use std::os::fd::AsRawFd;

    use nix::errno::Errno;
    use nix::sys::socket::{AddressFamily, SockFlag, SockProtocol, SockType, socket};

    let request = dellink_request(ifname)?;

    let sock = socket(
        AddressFamily::Netlink,
        SockType::Raw,
        SockFlag::SOCK_CLOEXEC,
        SockProtocol::NetlinkRoute,
    )
    .map_err(|e| EdgenetError::failed("failed to create netlink socket", e.desc()))?;

    // SAFETY: `sock` is an open socket owned by this function and `request`
    // is a live buffer of exactly `request.len()` bytes.
    let sent = unsafe {
        libc::send(
            sock.as_raw_fd(),
            request.as_ptr().cast(),
            request.len(),
            0,
        )
    };
    if sent < 0 {
        return Err(EdgenetError::failed(
            "failed to send netlink request",
            Errno::last().desc(),
        ));
    }

    tracing::trace!(ifname, bytes = sent, "RTM_DELLINK sent");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error, netlink requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn send_dellink(_ifname: &str) -> Result<()> {
    Err(EdgenetError::Config {
        message: "Linux required for interface control".into(),
    })
}
