//! `edgenet iptables` — Manage iptables chains and rules.

use std::sync::Arc;

use clap::{Args, Subcommand};
use edgenet_common::config::NetworkConfig;
use edgenet_core::command::SystemCommandRunner;
use edgenet_core::iptables::is_available;
use edgenet_core::{IPTables, IpTablesOps, RuleBuilder};

use crate::output;

/// Arguments for the `iptables` command.
#[derive(Args, Debug)]
pub struct IptablesArgs {
    /// Table to operate on. Defaults to the configured table.
    #[arg(short, long)]
    pub table: Option<String>,

    /// Chain or rule operation.
    #[command(subcommand)]
    pub action: IptablesAction,
}

/// Rule clauses. Omitted flags add no match.
#[derive(Args, Debug, Default)]
pub struct RuleArgs {
    /// Source address or CIDR.
    #[arg(short, long, default_value = "")]
    pub source: String,
    /// Destination address or CIDR.
    #[arg(short, long, default_value = "")]
    pub destination: String,
    /// Protocol, e.g. tcp or udp.
    #[arg(short, long, default_value = "")]
    pub protocol: String,
    /// Source port.
    #[arg(long, default_value_t = 0)]
    pub sport: u16,
    /// Destination port.
    #[arg(long, default_value_t = 0)]
    pub dport: u16,
    /// Jump target, e.g. ACCEPT or a chain name.
    #[arg(short, long, default_value = "")]
    pub jump: String,
}

impl From<RuleArgs> for RuleBuilder {
    fn from(args: RuleArgs) -> Self {
        Self::new()
            .source(args.source)
            .destination(args.destination)
            .protocol(args.protocol)
            .source_port(args.sport)
            .destination_port(args.dport)
            .jump(args.jump)
    }
}

/// Chain and rule operations.
#[derive(Subcommand, Debug)]
pub enum IptablesAction {
    /// List chain names.
    Chains,
    /// Dump the rules of a chain with counters.
    Rules {
        /// Chain name.
        chain: String,
    },
    /// Create a chain.
    NewChain {
        /// Chain name.
        chain: String,
    },
    /// Flush all rules from a chain.
    ClearChain {
        /// Chain name.
        chain: String,
    },
    /// Delete an empty chain.
    DeleteChain {
        /// Chain name.
        chain: String,
    },
    /// Append a rule to a chain.
    Append {
        /// Chain name.
        chain: String,
        /// Rule clauses.
        #[command(flatten)]
        rule: RuleArgs,
    },
    /// Insert a rule at a position in a chain.
    Insert {
        /// Chain name.
        chain: String,
        /// 1-based rule position.
        position: u32,
        /// Rule clauses.
        #[command(flatten)]
        rule: RuleArgs,
    },
    /// Delete the first rule matching the clauses.
    Delete {
        /// Chain name.
        chain: String,
        /// Rule clauses.
        #[command(flatten)]
        rule: RuleArgs,
    },
}

/// Executes the `iptables` command.
///
/// # Errors
///
/// Returns an error if the firewall tool is missing or the operation fails.
pub fn execute(args: IptablesArgs, config: &NetworkConfig, json: bool) -> anyhow::Result<()> {
    if !is_available(&config.iptables_binary) {
        anyhow::bail!("{} not found", config.iptables_binary);
    }

    let table = args.table.unwrap_or_else(|| config.default_table.clone());
    let ipt = IPTables::with_runner(
        table,
        config.iptables_binary.clone(),
        Arc::new(SystemCommandRunner),
    );

    match args.action {
        IptablesAction::Chains => output::print_list(&ipt.list_chains()?, json)?,
        IptablesAction::Rules { chain } => {
            output::print_list(&ipt.list_all_rules_with_counters(&chain)?, json)?;
        }
        IptablesAction::NewChain { chain } => ipt.new_chain(&chain)?,
        IptablesAction::ClearChain { chain } => ipt.clear_chain(&chain)?,
        IptablesAction::DeleteChain { chain } => ipt.delete_chain(&chain)?,
        IptablesAction::Append { chain, rule } => ipt.append(&chain, &rule.into())?,
        IptablesAction::Insert {
            chain,
            position,
            rule,
        } => ipt.insert(&chain, position, &rule.into())?,
        IptablesAction::Delete { chain, rule } => ipt.delete_rule(&chain, &rule.into())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Command};
    use clap::Parser;

    #[test]
    fn rule_flags_map_to_builder() {
        let cli = Cli::try_parse_from([
            "edgenet", "iptables", "-t", "nat", "append", "POSTROUTING", "-s", "10.0.0.0/24",
            "-j", "MASQUERADE",
        ])
        .unwrap();
        let Command::Iptables(args) = cli.command else {
            panic!("expected iptables command");
        };
        assert_eq!(args.table.as_deref(), Some("nat"));
        let IptablesAction::Append { chain, rule } = args.action else {
            panic!("expected append");
        };
        assert_eq!(chain, "POSTROUTING");
        assert_eq!(
            RuleBuilder::from(rule).build(),
            "-s 10.0.0.0/24 -j MASQUERADE"
        );
    }

    #[test]
    fn omitted_flags_add_no_clauses() {
        assert_eq!(RuleBuilder::from(RuleArgs::default()).build(), "");
    }
}
