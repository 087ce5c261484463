//! System-wide constants and default paths.

/// Directory holding bind-mounted network namespace handles.
///
/// Shared with `ip netns`, so namespaces created here are visible to it.
pub const NETNS_DIR: &str = "/run/netns";

/// Loopback interface brought up inside every new namespace.
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Firewall tool invoked by the iptables facade.
pub const IPTABLES_BINARY: &str = "iptables";

/// Table used when none is given.
pub const DEFAULT_TABLE: &str = "filter";

/// Prefix of chain header lines in `iptables -L` output.
pub const CHAIN_MARKER: &str = "Chain";

/// Kernel limit on interface name length, including the NUL terminator.
pub const IFNAMSIZ: usize = 16;

/// Returns the network namespace entry of the given task.
#[must_use]
pub fn thread_netns_path(pid: i32, tid: i32) -> String {
    format!("/proc/{pid}/task/{tid}/ns/net")
}
