//! Gossip tuning presets selected by the `profile` config key.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Network environment the gossip layer is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Single datacenter, low latency.
    Lan,
    /// Multiple datacenters, high latency.
    Wan,
    /// Loopback or single host, aggressive timings.
    Local,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown profile: {0}")]
pub struct UnknownProfile(pub String);

impl FromStr for Profile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lan" => Ok(Profile::Lan),
            "wan" => Ok(Profile::Wan),
            "local" => Ok(Profile::Local),
            other => Err(UnknownProfile(other.to_string())),
        }
    }
}

/// Timing and fan-out knobs for the gossip layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipPreset {
    pub tcp_timeout: Duration,
    pub indirect_checks: usize,
    pub retransmit_mult: usize,
    pub suspicion_mult: usize,
    pub push_pull_interval: Duration,
    pub probe_timeout: Duration,
    pub probe_interval: Duration,
    pub gossip_nodes: usize,
    pub gossip_interval: Duration,
}

impl GossipPreset {
    pub fn lan() -> Self {
        Self {
            tcp_timeout: Duration::from_secs(10),
            indirect_checks: 3,
            retransmit_mult: 4,
            suspicion_mult: 4,
            push_pull_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_millis(500),
            probe_interval: Duration::from_secs(1),
            gossip_nodes: 3,
            gossip_interval: Duration::from_millis(200),
        }
    }

    pub fn wan() -> Self {
        Self {
            tcp_timeout: Duration::from_secs(30),
            suspicion_mult: 6,
            push_pull_interval: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(3),
            probe_interval: Duration::from_secs(5),
            gossip_nodes: 4,
            gossip_interval: Duration::from_millis(500),
            ..Self::lan()
        }
    }

    pub fn local() -> Self {
        Self {
            tcp_timeout: Duration::from_secs(1),
            indirect_checks: 1,
            retransmit_mult: 2,
            suspicion_mult: 3,
            push_pull_interval: Duration::from_secs(15),
            probe_timeout: Duration::from_millis(200),
            probe_interval: Duration::from_secs(1),
            gossip_interval: Duration::from_millis(100),
            ..Self::lan()
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Lan => Self::lan(),
            Profile::Wan => Self::wan(),
            Profile::Local => Self::local(),
        }
    }
}
