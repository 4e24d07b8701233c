//! Membership agent.
//!
//! # Data Flow
//! ```text
//! Agent::start:
//!     resolve bind → select profile preset → build ServiceConfig
//!     → MembershipProvider::create → publish while Running → spawn event loop
//!
//! Agent::shutdown:
//!     Running → Leaving (one caller) → service.leave() → Terminated
//!     → shutdown signal fires
//! ```
//!
//! # Design Decisions
//! - Single use: a failed or finished agent is never started again
//! - The phase lock is never held across an await
//! - The service stopping on its own also terminates the agent

mod event_loop;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::config::address::{self, AddressError};
use crate::config::AgentConfig;
use crate::lifecycle::{ShutdownSignal, ShutdownTrigger};
use crate::membership::profile::UnknownProfile;
use crate::membership::{
    CoalesceWindow, GossipPreset, Member, MembershipError, MembershipProvider, MembershipService,
    Profile, ServiceConfig, StandaloneProvider,
};
use crate::observability::metrics;

use event_loop::EventLoop;

/// Capacity of the inbound event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 2048;

/// Maximum time a burst of events is held back before delivery.
pub const COALESCE_PERIOD: Duration = Duration::from_secs(3);

/// Quiet time that releases a burst early.
pub const QUIESCENT_PERIOD: Duration = Duration::from_secs(1);

/// Errors that abort [`Agent::start`].
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid bind address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error(transparent)]
    UnknownProfile(#[from] UnknownProfile),

    #[error("can not setup membership service: {0}")]
    ServiceCreateFailed(#[source] MembershipError),

    #[error("agent has already been started")]
    AlreadyStarted,

    #[error("agent has already been shut down")]
    Terminated,
}

/// Errors returned by [`Agent::shutdown`].
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to leave the cluster: {0}")]
    LeaveFailed(#[source] MembershipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Leaving,
    Terminated,
}

/// Shutdown phase plus the broadcast fired when it reaches `Terminated`.
#[derive(Debug)]
pub(crate) struct ShutdownState {
    phase: Mutex<Phase>,
    trigger: ShutdownTrigger,
}

impl ShutdownState {
    fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Running),
            trigger: ShutdownTrigger::new(),
        }
    }

    /// Claim the leave. Returns the phase seen before the call; only a
    /// caller that saw `Running` owns the leave.
    fn begin(&self) -> Phase {
        let mut phase = self.phase.lock().expect("shutdown phase mutex poisoned");
        let previous = *phase;
        if previous == Phase::Running {
            *phase = Phase::Leaving;
        }
        previous
    }

    /// Move to `Terminated` and fire the broadcast. Returns `true` for the
    /// call that made the transition.
    fn finish(&self) -> bool {
        let mut phase = self.phase.lock().expect("shutdown phase mutex poisoned");
        if *phase == Phase::Terminated {
            return false;
        }
        *phase = Phase::Terminated;
        self.trigger.trigger();
        true
    }

    /// The membership service stopped by itself. Terminates the agent unless
    /// a leave is already in flight.
    pub(crate) fn service_stopped(&self) -> bool {
        let mut phase = self.phase.lock().expect("shutdown phase mutex poisoned");
        if *phase != Phase::Running {
            return false;
        }
        *phase = Phase::Terminated;
        self.trigger.trigger();
        true
    }

    fn phase(&self) -> Phase {
        *self.phase.lock().expect("shutdown phase mutex poisoned")
    }

    fn is_terminated(&self) -> bool {
        self.phase() == Phase::Terminated
    }

    /// Store `service` in `slot` while the agent is still running. A
    /// shutdown that already began gets the service handed back instead.
    fn publish<S>(&self, slot: &OnceLock<S>, service: S) -> Result<(), S> {
        let phase = self.phase.lock().expect("shutdown phase mutex poisoned");
        if *phase != Phase::Running {
            return Err(service);
        }
        slot.set(service)
    }
}

/// Finishes the shutdown even if the leaving future is dropped half way.
struct FinishOnDrop<'a>(&'a ShutdownState);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// A cluster member process: one membership service plus its event loop.
pub struct Agent<P: MembershipProvider = StandaloneProvider> {
    config: Arc<AgentConfig>,
    provider: P,
    started: AtomicBool,
    service: OnceLock<P::Service>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
    state: Arc<ShutdownState>,
    span: tracing::Span,
}

impl Agent<StandaloneProvider> {
    /// Create an agent backed by the standalone membership service.
    pub fn new(config: AgentConfig) -> Self {
        Self::with_provider(config, StandaloneProvider)
    }
}

impl<P: MembershipProvider> Agent<P> {
    /// Create an agent that builds its membership service with `provider`.
    pub fn with_provider(config: AgentConfig, provider: P) -> Self {
        let span = tracing::info_span!("agent", node = %config.node_name);
        Self {
            config: Arc::new(config),
            provider,
            started: AtomicBool::new(false),
            service: OnceLock::new(),
            event_loop: Mutex::new(None),
            state: Arc::new(ShutdownState::new()),
            span,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Bring up the membership service and the event loop.
    ///
    /// Returns as soon as the loop is spawned. May only be called once,
    /// whether or not it succeeds, and never after a shutdown.
    pub async fn start(&self) -> Result<(), StartError> {
        if self.state.phase() != Phase::Running {
            return Err(StartError::Terminated);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(StartError::AlreadyStarted);
        }

        self.setup().instrument(self.span.clone()).await
    }

    async fn setup(&self) -> Result<(), StartError> {
        let config = &self.config;

        let bind = address::resolve(&config.bind).await?;
        let profile: Profile = config.profile.parse()?;

        let window = CoalesceWindow {
            period: COALESCE_PERIOD,
            quiescent: QUIESCENT_PERIOD,
        };
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let service_config = ServiceConfig {
            bind,
            node_name: config.node_name.clone(),
            tags: config.tags().clone(),
            preset: GossipPreset::for_profile(profile),
            member_coalesce: window,
            user_coalesce: window,
            reconnect_timeout: (!config.reconnect_timeout.is_zero()).then_some(config.reconnect_timeout),
            event_tx,
        };

        tracing::info!(
            bind = %bind,
            profile = %config.profile,
            server = config.server,
            bootstrap_expect = config.bootstrap_expect,
            "Membership agent starting"
        );

        let service = self
            .provider
            .create(service_config)
            .await
            .map_err(StartError::ServiceCreateFailed)?;

        let event_loop = EventLoop::new(
            config.node_name.clone(),
            event_rx,
            service.shutdown_signal(),
            Arc::clone(&self.state),
        );

        // A shutdown that raced the start never saw the service.
        if let Err(service) = self.state.publish(&self.service, service) {
            tracing::warn!("Agent shut down during start, leaving immediately");
            if let Err(e) = service.leave().await {
                tracing::error!(error = %e, "Leave after shutdown failed");
            }
            return Err(StartError::Terminated);
        }

        let handle = tokio::spawn(event_loop.run().instrument(self.span.clone()));
        *self.event_loop.lock().expect("event loop mutex poisoned") = Some(handle);

        Ok(())
    }

    /// Whether the membership service is up and the agent not yet terminal.
    pub fn is_running(&self) -> bool {
        self.service.get().is_some() && !self.state.is_terminated()
    }

    /// Handle that fires once the agent reaches its terminal state.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.state.trigger.subscribe()
    }

    /// Leave the cluster and move to the terminal state.
    ///
    /// Idempotent: later and concurrent callers wait for the first one and
    /// report success. Only the caller that performed the leave sees its
    /// error. The agent is terminal afterwards either way.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        match self.state.begin() {
            Phase::Running => {}
            Phase::Leaving => {
                self.shutdown_signal().wait().await;
                return Ok(());
            }
            Phase::Terminated => return Ok(()),
        }

        let _finish = FinishOnDrop(&self.state);

        let result = match self.service.get() {
            Some(service) => {
                tracing::info!(parent: &self.span, "Agent leaving cluster");
                service
                    .leave()
                    .instrument(self.span.clone())
                    .await
                    .map_err(ShutdownError::LeaveFailed)
            }
            None => Ok(()),
        };

        match &result {
            Ok(()) => {
                metrics::record_shutdown("left");
                tracing::info!(parent: &self.span, "Agent shut down");
            }
            Err(e) => {
                metrics::record_shutdown("leave_failed");
                tracing::error!(parent: &self.span, error = %e, "Agent shut down without a clean leave");
            }
        }

        result
    }

    /// Current cluster view, empty before start.
    pub fn members(&self) -> Vec<Member> {
        self.service.get().map(|s| s.members()).unwrap_or_default()
    }

    /// Wait for the event loop task to exit. Returns immediately if the loop
    /// was never started or has already been joined.
    pub async fn join_event_loop(&self) -> Result<(), JoinError> {
        let handle = self.event_loop.lock().expect("event loop mutex poisoned").take();
        match handle {
            Some(handle) => handle.await,
            None => Ok(()),
        }
    }
}
