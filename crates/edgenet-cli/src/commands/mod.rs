//! CLI command definitions and dispatch.

pub mod iptables;
pub mod link;
pub mod netns;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use edgenet_common::config::NetworkConfig;

/// edgenet — per-workload network namespaces, links, and firewall rules.
#[derive(Parser, Debug)]
#[command(name = "edgenet", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file overriding the built-in defaults.
    #[arg(long, global = true, env = "EDGENET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print listings as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, delete, and locate named network namespaces.
    Netns(netns::NetnsArgs),
    /// Bring interfaces up or remove them.
    Link(link::LinkArgs),
    /// Manage iptables chains and rules.
    Iptables(iptables::IptablesArgs),
}

/// Loads the configuration file if one was given, else the defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<NetworkConfig> {
    match path {
        Some(path) => Ok(NetworkConfig::load(path)?),
        None => Ok(NetworkConfig::default()),
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Netns(args) => netns::execute(args, &config, cli.json),
        Command::Link(args) => link::execute(args),
        Command::Iptables(args) => iptables::execute(args, &config, cli.json),
    }
}
