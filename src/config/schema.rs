//! Configuration schema definitions.
//!
//! `AgentConfig` is a passive data holder. The only semantic check (the
//! profile name) happens when the agent starts.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for a node agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Whether this node runs in server mode.
    pub server: bool,

    /// Number of servers expected before bootstrapping.
    #[serde(rename = "bootstrap-expect")]
    pub bootstrap_expect: i32,

    /// Gossip tuning profile: `lan`, `wan` or `local`.
    pub profile: String,

    /// Unique name of this node in the cluster.
    pub node_name: String,

    /// Gossip bind address, `host` or `host:port`.
    pub bind: String,

    /// Arbitrary key/value metadata advertised to other members.
    pub tags: BTreeMap<String, String>,

    /// How long a failed member is kept around for reconnect attempts.
    /// Zero keeps the membership service default.
    #[serde(with = "humantime_serde")]
    pub reconnect_timeout: Duration,
}

impl AgentConfig {
    /// Tags advertised by this node.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Merge `other` on top of `self`, returning a new config.
    ///
    /// Fields of `other` win only when set. `bootstrap_expect` is taken from
    /// `other` whenever it is non-negative, so any valid value (including 0)
    /// replaces the base.
    pub fn merge(&self, other: &AgentConfig) -> AgentConfig {
        let mut result = self.clone();

        if other.server {
            result.server = true;
        }

        if other.bootstrap_expect >= 0 {
            result.bootstrap_expect = other.bootstrap_expect;
        }

        if !other.profile.is_empty() {
            result.profile = other.profile.clone();
        }

        if !other.node_name.is_empty() {
            result.node_name = other.node_name.clone();
        }

        if !other.bind.is_empty() {
            result.bind = other.bind.clone();
        }

        if !other.tags.is_empty() {
            result.tags = other.tags.clone();
        }

        if !other.reconnect_timeout.is_zero() {
            result.reconnect_timeout = other.reconnect_timeout;
        }

        result
    }
}
