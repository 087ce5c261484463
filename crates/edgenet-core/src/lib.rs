//! # edgenet-core
//!
//! Per-workload Linux network isolation primitives.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: named, bind-mounted network namespaces under `/run/netns`.
//! - **Interfaces**: bringing links up via ioctl and removing them via netlink.
//! - **iptables**: a serialized chain/rule facade and a rule builder.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.
//!
//! Everything here is synchronous and runs on the caller's thread.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod command;
pub mod filesystem;
pub mod interface;
pub mod iptables;
pub mod namespace;

pub use interface::{InterfaceManager, NetworkInterfaceManager};
pub use iptables::{IPTables, IpTablesOps, RuleBuilder};
pub use namespace::NamespaceManager;
