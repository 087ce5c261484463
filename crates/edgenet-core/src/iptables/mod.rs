//! Serialized iptables chain and rule management.
//!
//! Every operation shells out to the iptables tool with `-t <table>`. The
//! tool is not safe to run concurrently against one table, so each
//! [`IPTables`] instance lets only one command run at a time. Use separate
//! instances for separate tables if per-table concurrency is needed.

pub mod rule;

use std::sync::{Arc, Mutex, PoisonError};

use edgenet_common::constants::{CHAIN_MARKER, DEFAULT_TABLE, IPTABLES_BINARY};
use edgenet_common::error::{EdgenetError, Result};

use crate::command::{CommandOutput, CommandRunner, SystemCommandRunner};

pub use rule::RuleBuilder;

/// Chain and rule operations, implemented by [`IPTables`] and by test fakes.
pub trait IpTablesOps: Send + Sync {
    /// Appends a rule to the end of a chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn append(&self, chain: &str, rule: &RuleBuilder) -> Result<()>;

    /// Inserts a rule at a 1-based position in a chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn insert(&self, chain: &str, position: u32, rule: &RuleBuilder) -> Result<()>;

    /// Deletes the first rule in a chain matching the specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn delete_rule(&self, chain: &str, rule: &RuleBuilder) -> Result<()>;

    /// Creates a user-defined chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn new_chain(&self, chain: &str) -> Result<()>;

    /// Removes every rule from a chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn clear_chain(&self, chain: &str) -> Result<()>;

    /// Deletes an empty user-defined chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn delete_chain(&self, chain: &str) -> Result<()>;

    /// Lists chain names in the table, in the order iptables prints them.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn list_chains(&self) -> Result<Vec<String>>;

    /// Returns the rules of a chain with packet and byte counters, one line each.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn list_all_rules_with_counters(&self, chain: &str) -> Result<Vec<String>>;

    /// Returns an empty rule builder.
    fn create_rule(&self) -> RuleBuilder {
        RuleBuilder::new()
    }
}

/// iptables facade bound to one table.
pub struct IPTables {
    table: String,
    binary: String,
    runner: Arc<dyn CommandRunner>,
    lock: Mutex<()>,
}

impl Default for IPTables {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl IPTables {
    /// Creates a facade for `table` that runs the system `iptables`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_runner(table, IPTABLES_BINARY, Arc::new(SystemCommandRunner))
    }

    /// Creates a facade with an explicit binary and command runner.
    #[must_use]
    pub fn with_runner(
        table: impl Into<String>,
        binary: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            table: table.into(),
            binary: binary.into(),
            runner,
            lock: Mutex::new(()),
        }
    }

    /// Returns the table this facade operates on.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Runs one iptables invocation while holding the instance lock.
    fn execute(&self, args: Vec<String>) -> Result<CommandOutput> {
        let mut full = vec!["-t".to_string(), self.table.clone()];
        full.extend(args);

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(table = %self.table, args = ?full, "executing iptables command");

        let output = self.runner.run(&self.binary, &full)?;
        if !output.is_success() {
            return Err(EdgenetError::Failed {
                message: format!(
                    "failed to execute iptables command: {} {} (exit status {})",
                    self.binary,
                    full.join(" "),
                    output.exit_code
                ),
            });
        }
        Ok(output)
    }

    fn chain_command(flag: &str, chain: &str) -> Vec<String> {
        vec![flag.to_string(), chain.to_string()]
    }
}

/// Extracts chain names from `iptables -L` output.
///
/// Each line starting with `Chain` contributes the token that follows it.
#[must_use]
pub fn parse_chain_names(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let rest = line.strip_prefix(CHAIN_MARKER)?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            rest.split_whitespace().next().map(str::to_string)
        })
        .collect()
}

impl IpTablesOps for IPTables {
    fn append(&self, chain: &str, rule: &RuleBuilder) -> Result<()> {
        let mut args = Self::chain_command("-A", chain);
        args.extend(rule.args());
        self.execute(args)?;
        tracing::info!(table = %self.table, chain, rule = %rule, "rule appended");
        Ok(())
    }

    fn insert(&self, chain: &str, position: u32, rule: &RuleBuilder) -> Result<()> {
        let mut args = Self::chain_command("-I", chain);
        args.push(position.to_string());
        args.extend(rule.args());
        self.execute(args)?;
        tracing::info!(table = %self.table, chain, position, rule = %rule, "rule inserted");
        Ok(())
    }

    fn delete_rule(&self, chain: &str, rule: &RuleBuilder) -> Result<()> {
        let mut args = Self::chain_command("-D", chain);
        args.extend(rule.args());
        self.execute(args)?;
        tracing::info!(table = %self.table, chain, rule = %rule, "rule deleted");
        Ok(())
    }

    fn new_chain(&self, chain: &str) -> Result<()> {
        self.execute(Self::chain_command("-N", chain))?;
        tracing::info!(table = %self.table, chain, "chain created");
        Ok(())
    }

    fn clear_chain(&self, chain: &str) -> Result<()> {
        self.execute(Self::chain_command("-F", chain))?;
        tracing::info!(table = %self.table, chain, "chain flushed");
        Ok(())
    }

    fn delete_chain(&self, chain: &str) -> Result<()> {
        self.execute(Self::chain_command("-X", chain))?;
        tracing::info!(table = %self.table, chain, "chain deleted");
        Ok(())
    }

    fn list_chains(&self) -> Result<Vec<String>> {
        let output = self.execute(vec!["-L".into(), "-n".into()])?;
        Ok(parse_chain_names(&output.lines()))
    }

    fn list_all_rules_with_counters(&self, chain: &str) -> Result<Vec<String>> {
        let output = self.execute(vec!["-v".into(), "-S".into(), chain.to_string()])?;
        Ok(output.lines())
    }
}

/// Returns whether the firewall tool can be found on `PATH` (or at the given path).
#[must_use]
pub fn is_available(binary: &str) -> bool {
    which::which(binary).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every invocation and answers with a fixed output.
    struct ScriptedRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        output: CommandOutput,
    }

    impl ScriptedRunner {
        fn new(output: CommandOutput) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                output,
            })
        }

        fn last_call(&self) -> (String, Vec<String>) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            Ok(self.output.clone())
        }
    }

    fn iptables(runner: &Arc<ScriptedRunner>) -> IPTables {
        IPTables::with_runner("nat", "iptables", runner.clone())
    }

    fn joined(call: &(String, Vec<String>)) -> String {
        format!("{} {}", call.0, call.1.join(" "))
    }

    #[test]
    fn default_table_is_filter() {
        assert_eq!(IPTables::default().table(), "filter");
    }

    #[test]
    fn append_formats_chain_and_rule() {
        let runner = ScriptedRunner::new(CommandOutput::success(""));
        let ipt = iptables(&runner);
        let rule = ipt
            .create_rule()
            .source("10.0.0.0/24")
            .protocol("tcp")
            .destination_port(80)
            .jump("ACCEPT");

        ipt.append("FORWARD", &rule).unwrap();
        assert_eq!(
            joined(&runner.last_call()),
            "iptables -t nat -A FORWARD -s 10.0.0.0/24 -p tcp --dport 80 -j ACCEPT"
        );
    }

    #[test]
    fn insert_places_position_before_rule() {
        let runner = ScriptedRunner::new(CommandOutput::success(""));
        let ipt = iptables(&runner);
        ipt.insert("INPUT", 1, &RuleBuilder::new().jump("DROP"))
            .unwrap();
        assert_eq!(
            joined(&runner.last_call()),
            "iptables -t nat -I INPUT 1 -j DROP"
        );
    }

    #[test]
    fn delete_rule_uses_dash_d() {
        let runner = ScriptedRunner::new(CommandOutput::success(""));
        let ipt = iptables(&runner);
        ipt.delete_rule("POSTROUTING", &RuleBuilder::new().jump("MASQUERADE"))
            .unwrap();
        assert_eq!(
            joined(&runner.last_call()),
            "iptables -t nat -D POSTROUTING -j MASQUERADE"
        );
    }

    #[test]
    fn chain_lifecycle_commands() {
        let runner = ScriptedRunner::new(CommandOutput::success(""));
        let ipt = iptables(&runner);

        ipt.new_chain("WL_1").unwrap();
        assert_eq!(joined(&runner.last_call()), "iptables -t nat -N WL_1");
        ipt.clear_chain("WL_1").unwrap();
        assert_eq!(joined(&runner.last_call()), "iptables -t nat -F WL_1");
        ipt.delete_chain("WL_1").unwrap();
        assert_eq!(joined(&runner.last_call()), "iptables -t nat -X WL_1");
    }

    #[test]
    fn list_chains_returns_names_in_output_order() {
        let listing = "Chain INPUT (policy ACCEPT)\n\
                       target     prot opt source               destination\n\
                       \n\
                       Chain FORWARD (policy DROP)\n\
                       target     prot opt source               destination\n\
                       ACCEPT     all  --  0.0.0.0/0            0.0.0.0/0\n";
        let runner = ScriptedRunner::new(CommandOutput::success(listing));
        let ipt = iptables(&runner);

        assert_eq!(ipt.list_chains().unwrap(), vec!["INPUT", "FORWARD"]);
        assert_eq!(joined(&runner.last_call()), "iptables -t nat -L -n");
    }

    #[test]
    fn parse_chain_names_ignores_lookalikes() {
        let lines = vec![
            "Chain DOCKER (2 references)".to_string(),
            "Chainsaw not a header".to_string(),
            "  Chain indented".to_string(),
        ];
        assert_eq!(parse_chain_names(&lines), vec!["DOCKER"]);
    }

    #[test]
    fn list_rules_returns_lines_verbatim() {
        let dump = "-P INPUT ACCEPT -c 10 2000\n-A INPUT -s 10.0.0.1/32 -c 0 0 -j DROP\n";
        let runner = ScriptedRunner::new(CommandOutput::success(dump));
        let ipt = iptables(&runner);

        let rules = ipt.list_all_rules_with_counters("INPUT").unwrap();
        assert_eq!(
            rules,
            vec![
                "-P INPUT ACCEPT -c 10 2000",
                "-A INPUT -s 10.0.0.1/32 -c 0 0 -j DROP"
            ]
        );
        assert_eq!(joined(&runner.last_call()), "iptables -t nat -v -S INPUT");
    }

    #[test]
    fn non_zero_exit_is_failed() {
        let runner = ScriptedRunner::new(CommandOutput {
            stdout: String::new(),
            stderr: "iptables: No chain/target/match by that name.".into(),
            exit_code: 1,
        });
        let ipt = iptables(&runner);

        let err = ipt.delete_chain("MISSING").unwrap_err();
        assert!(matches!(err, EdgenetError::Failed { .. }));
        assert_eq!(
            err.to_string(),
            "failed to execute iptables command: iptables -t nat -X MISSING (exit status 1)"
        );
    }

    #[test]
    fn listing_failure_is_failed() {
        let runner = ScriptedRunner::new(CommandOutput {
            exit_code: 2,
            ..CommandOutput::default()
        });
        let ipt = iptables(&runner);
        assert!(ipt.list_chains().is_err());
        assert!(ipt.list_all_rules_with_counters("INPUT").is_err());
    }

    #[test]
    fn missing_binary_is_not_available() {
        assert!(!is_available("edgenet-no-such-firewall"));
    }
}
