//! `edgenet link` — Bring interfaces up or remove them.

use clap::{Args, Subcommand};
use edgenet_core::{InterfaceManager, NetworkInterfaceManager};

/// Arguments for the `link` command.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Link operation.
    #[command(subcommand)]
    pub action: LinkAction,
}

/// Link operations, applied in the caller's network namespace.
#[derive(Subcommand, Debug)]
pub enum LinkAction {
    /// Set the UP and RUNNING flags on an interface.
    Up {
        /// Interface name.
        ifname: String,
    },
    /// Request deletion of an interface. Does not wait for confirmation.
    Del {
        /// Interface name.
        ifname: String,
    },
}

/// Executes the `link` command.
///
/// # Errors
///
/// Returns an error if the interface operation fails.
pub fn execute(args: LinkArgs) -> anyhow::Result<()> {
    let interfaces = NetworkInterfaceManager::new();
    match args.action {
        LinkAction::Up { ifname } => interfaces.bring_up_interface(&ifname)?,
        LinkAction::Del { ifname } => interfaces.remove_interface(&ifname)?,
    }
    Ok(())
}
