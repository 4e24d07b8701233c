//! Membership service boundary.
//!
//! # Data Flow
//! ```text
//! Agent::start
//!     → ServiceConfig (bind, identity, tags, coalescing, preset, event_tx)
//!     → MembershipProvider::create
//!     → MembershipService (runs its own tasks)
//!         → Event on event_tx ──────────▶ agent event loop
//!         → shutdown_signal() fires ────▶ agent event loop exits
//!
//! Agent::shutdown
//!     → MembershipService::leave
//! ```
//!
//! # Design Decisions
//! - The gossip protocol is external; this module only fixes the seam
//! - Events travel on a bounded channel owned by the agent
//! - `standalone` is the shipped single-node backend

pub mod coalesce;
pub mod profile;
pub mod standalone;
pub mod types;

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::lifecycle::ShutdownSignal;

pub use profile::{GossipPreset, Profile};
pub use standalone::{StandaloneProvider, StandaloneService};
pub use types::{Event, Member, MemberEvent, MemberEventType, MemberStatus, UserEvent};

/// Errors raised by a membership service.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Could not bind the gossip address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure inside the service.
    #[error("membership I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service refused or failed an operation.
    #[error("membership service error: {0}")]
    Service(String),
}

/// Batching windows for one event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalesceWindow {
    /// Maximum time a burst is held before delivery. Zero disables coalescing.
    pub period: Duration,
    /// Quiet time after the last event that triggers an early delivery.
    pub quiescent: Duration,
}

/// Everything a membership service needs to start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub node_name: String,
    pub tags: BTreeMap<String, String>,
    pub preset: GossipPreset,
    pub member_coalesce: CoalesceWindow,
    pub user_coalesce: CoalesceWindow,
    /// `None` keeps the service default.
    pub reconnect_timeout: Option<Duration>,
    /// Where the service delivers events.
    pub event_tx: mpsc::Sender<Event>,
}

/// A running membership service instance.
pub trait MembershipService: Send + Sync + 'static {
    /// Fires once the service has stopped, either after a leave or because
    /// it failed on its own.
    fn shutdown_signal(&self) -> ShutdownSignal;

    /// Gracefully leave the cluster and stop the service.
    fn leave(&self) -> impl Future<Output = Result<(), MembershipError>> + Send;

    /// Current view of the cluster.
    fn members(&self) -> Vec<Member>;
}

/// Factory for membership services.
pub trait MembershipProvider: Send + Sync + 'static {
    type Service: MembershipService;

    fn create(
        &self,
        config: ServiceConfig,
    ) -> impl Future<Output = Result<Self::Service, MembershipError>> + Send;
}
