//! gcron node agent library.
//!
//! Brings a process up as a member of a gossip cluster, consumes membership
//! events and leaves the cluster cleanly on termination signals.

pub mod agent;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod membership;
pub mod observability;

pub use agent::Agent;
pub use config::AgentConfig;
pub use lifecycle::LifecycleController;
