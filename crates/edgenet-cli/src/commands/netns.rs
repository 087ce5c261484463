//! `edgenet netns` — Create, delete, and locate named network namespaces.

use std::sync::Arc;

use clap::{Args, Subcommand};
use edgenet_common::config::NetworkConfig;
use edgenet_core::{NamespaceManager, NetworkInterfaceManager};

use crate::output;

/// Arguments for the `netns` command.
#[derive(Args, Debug)]
pub struct NetnsArgs {
    /// Namespace operation.
    #[command(subcommand)]
    pub action: NetnsAction,
}

/// Namespace operations.
#[derive(Subcommand, Debug)]
pub enum NetnsAction {
    /// Create a namespace (no-op if it exists).
    Add {
        /// Namespace name.
        name: String,
    },
    /// Delete a namespace (no-op if it does not exist).
    Del {
        /// Namespace name.
        name: String,
    },
    /// Print the handle path of a namespace.
    Path {
        /// Namespace name.
        name: String,
    },
    /// Show whether a namespace is provisioned.
    State {
        /// Namespace name.
        name: String,
    },
    /// List provisioned namespaces.
    List,
}

/// Executes the `netns` command.
///
/// # Errors
///
/// Returns an error if the namespace operation fails.
pub fn execute(args: NetnsArgs, config: &NetworkConfig, json: bool) -> anyhow::Result<()> {
    let manager = NamespaceManager::with_config(config, Arc::new(NetworkInterfaceManager::new()))?;

    match args.action {
        NetnsAction::Add { name } => {
            tracing::info!(ns = %name, "adding network namespace");
            manager.create_network_namespace(&name)?;
        }
        NetnsAction::Del { name } => {
            tracing::info!(ns = %name, "deleting network namespace");
            manager.delete_network_namespace(&name)?;
        }
        NetnsAction::Path { name } => {
            output::print_value(&manager.network_namespace_path(&name).to_string_lossy());
        }
        NetnsAction::State { name } => {
            output::print_value(&manager.namespace_state(&name).to_string());
        }
        NetnsAction::List => {
            output::print_list(&manager.list_network_namespaces()?, json)?;
        }
    }
    Ok(())
}
