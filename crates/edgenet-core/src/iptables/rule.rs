//! Fluent builder for iptables rule specifications.

use std::fmt;

/// Builder for an iptables rule specification.
///
/// Empty strings and zero ports leave their clause out entirely, so an
/// unset field means "no filter" rather than an empty match. Clauses are
/// always rendered in the order source, destination, protocol, source port,
/// destination port, jump, regardless of the order the setters were called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBuilder {
    source: Option<String>,
    destination: Option<String>,
    protocol: Option<String>,
    source_port: Option<u16>,
    destination_port: Option<u16>,
    jump: Option<String>,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

impl RuleBuilder {
    /// Creates an empty rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the source address (`-s`).
    #[must_use]
    pub fn source(mut self, addr: impl Into<String>) -> Self {
        if let Some(addr) = non_empty(addr) {
            self.source = Some(addr);
        }
        self
    }

    /// Matches the destination address (`-d`).
    #[must_use]
    pub fn destination(mut self, addr: impl Into<String>) -> Self {
        if let Some(addr) = non_empty(addr) {
            self.destination = Some(addr);
        }
        self
    }

    /// Matches the protocol (`-p`).
    #[must_use]
    pub fn protocol(mut self, proto: impl Into<String>) -> Self {
        if let Some(proto) = non_empty(proto) {
            self.protocol = Some(proto);
        }
        self
    }

    /// Sets the jump target (`-j`).
    #[must_use]
    pub fn jump(mut self, target: impl Into<String>) -> Self {
        if let Some(target) = non_empty(target) {
            self.jump = Some(target);
        }
        self
    }

    /// Matches the source port (`--sport`).
    #[must_use]
    pub const fn source_port(mut self, port: u16) -> Self {
        if port != 0 {
            self.source_port = Some(port);
        }
        self
    }

    /// Matches the destination port (`--dport`).
    #[must_use]
    pub const fn destination_port(mut self, port: u16) -> Self {
        if port != 0 {
            self.destination_port = Some(port);
        }
        self
    }

    /// Returns the rule as argument tokens, in clause order.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut push = |flag: &str, value: String| {
            args.push(flag.to_string());
            args.push(value);
        };
        if let Some(addr) = &self.source {
            push("-s", addr.clone());
        }
        if let Some(addr) = &self.destination {
            push("-d", addr.clone());
        }
        if let Some(proto) = &self.protocol {
            push("-p", proto.clone());
        }
        if let Some(port) = self.source_port {
            push("--sport", port.to_string());
        }
        if let Some(port) = self.destination_port {
            push("--dport", port.to_string());
        }
        if let Some(target) = &self.jump {
            push("-j", target.clone());
        }
        args
    }

    /// Renders the rule specification as a single string.
    #[must_use]
    pub fn build(&self) -> String {
        self.args().join(" ")
    }

    /// Returns whether no clause has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Clears every clause so the builder can be reused.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for RuleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_adds_no_clause() {
        let rule = RuleBuilder::new().source("").build();
        assert!(!rule.contains("-s"));
        assert!(rule.is_empty());
    }

    #[test]
    fn zero_port_adds_no_clause() {
        let rule = RuleBuilder::new().destination_port(0).build();
        assert!(!rule.contains("--dport"));
        let rule = RuleBuilder::new().source_port(0).build();
        assert!(!rule.contains("--sport"));
    }

    #[test]
    fn empty_protocol_and_jump_add_no_clause() {
        let rule = RuleBuilder::new().protocol("").jump("");
        assert!(rule.is_empty());
    }

    #[test]
    fn clauses_render_in_fixed_order() {
        let rule = RuleBuilder::new()
            .jump("ACCEPT")
            .destination_port(443)
            .source_port(1024)
            .protocol("tcp")
            .destination("10.0.0.2")
            .source("10.0.0.1");
        assert_eq!(
            rule.build(),
            "-s 10.0.0.1 -d 10.0.0.2 -p tcp --sport 1024 --dport 443 -j ACCEPT"
        );
    }

    #[test]
    fn args_match_build() {
        let rule = RuleBuilder::new().source("172.17.0.0/16").jump("MASQUERADE");
        assert_eq!(rule.args(), vec!["-s", "172.17.0.0/16", "-j", "MASQUERADE"]);
        assert_eq!(rule.to_string(), rule.build());
    }

    #[test]
    fn empty_value_keeps_previous_clause() {
        let rule = RuleBuilder::new().source("10.0.0.1").source("");
        assert_eq!(rule.build(), "-s 10.0.0.1");
    }

    #[test]
    fn reset_clears_everything() {
        let mut rule = RuleBuilder::new().source("10.0.0.1").destination_port(80);
        rule.reset();
        assert_eq!(rule.build(), "");
        assert!(rule.is_empty());
    }
}
