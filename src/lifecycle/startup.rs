//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the effective configuration (defaults merged with the file)
//! - Construct and start the agent
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned, never retried
//! - The agent is returned in an `Arc` so the controller can hand it to the
//!   shutdown task

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::agent::{Agent, StartError};
use crate::config::{read_config, AgentConfig, ConfigError};
use crate::membership::MembershipProvider;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to setup the gcron agent: {0}")]
    Agent(#[from] StartError),
}

/// Read the configuration, optionally layered with a file.
pub fn load(config_file: Option<&Path>) -> Result<AgentConfig, StartupError> {
    let config = read_config(config_file)?;
    tracing::info!(
        node = %config.node_name,
        profile = %config.profile,
        bind = %config.bind,
        "Configuration loaded"
    );
    Ok(config)
}

/// Construct the agent and start it.
pub async fn start_agent<P: MembershipProvider>(
    config: AgentConfig,
    provider: P,
) -> Result<Arc<Agent<P>>, StartupError> {
    let agent = Arc::new(Agent::with_provider(config, provider));
    agent.start().await?;
    Ok(agent)
}
