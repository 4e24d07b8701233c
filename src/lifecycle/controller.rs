//! Signal-driven shutdown state machine.
//!
//! ```text
//!            hangup
//!           ┌──────┐
//!           ▼      │
//!       Waiting ───┘ ──── agent stopped ────────▶ Done(AgentTerminated)
//!           │      └──── other signal ──────────▶ Done(FailFast)
//!   interrupt/terminate
//!           ▼
//!       Draining ─────── shutdown ok ───────────▶ Done(Drained)
//!                  ├──── shutdown error ────────▶ Done(ShutdownFailed)
//!                  ├──── another signal ────────▶ Done(Aborted)
//!                  └──── grace period elapsed ──▶ Done(GraceExpired)
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::agent::Agent;
use crate::lifecycle::signals::Signal;
use crate::membership::MembershipProvider;

/// Time allowed for a graceful leave before giving up.
pub const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(3);

/// How the controller finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The agent shut down on its own before any signal.
    AgentTerminated,
    /// Graceful leave completed within the grace period.
    Drained,
    /// A signal with no graceful meaning arrived.
    FailFast(Signal),
    /// A second signal arrived while draining.
    Aborted(Signal),
    /// The grace period elapsed first.
    GraceExpired,
    /// The leave itself failed.
    ShutdownFailed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::AgentTerminated | Outcome::Drained)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Waiting,
    Draining,
    Done(Outcome),
}

/// Waits for signals and drives the agent's shutdown.
pub struct LifecycleController<P: MembershipProvider> {
    agent: Arc<Agent<P>>,
    signals: mpsc::Receiver<Signal>,
    signals_open: bool,
    grace: Duration,
}

impl<P: MembershipProvider> LifecycleController<P> {
    pub fn new(agent: Arc<Agent<P>>, signals: mpsc::Receiver<Signal>) -> Self {
        Self::with_grace(agent, signals, GRACEFUL_TIMEOUT)
    }

    pub fn with_grace(agent: Arc<Agent<P>>, signals: mpsc::Receiver<Signal>, grace: Duration) -> Self {
        Self {
            agent,
            signals,
            signals_open: true,
            grace,
        }
    }

    /// Run until an outcome is reached.
    pub async fn run(mut self) -> Outcome {
        let mut state = State::Waiting;
        loop {
            state = match state {
                State::Waiting => self.wait().await,
                State::Draining => State::Done(self.drain().await),
                State::Done(outcome) => return outcome,
            };
        }
    }

    /// Next signal, or `None` once the channel is closed (never resolves).
    async fn next_signal(&mut self) -> Signal {
        if self.signals_open {
            if let Some(signal) = self.signals.recv().await {
                return signal;
            }
            self.signals_open = false;
            tracing::debug!("Signal channel closed");
        }
        std::future::pending().await
    }

    async fn wait(&mut self) -> State {
        let agent_stopped = self.agent.shutdown_signal();

        let signal = tokio::select! {
            signal = self.next_signal() => signal,
            _ = agent_stopped.wait() => {
                tracing::info!("Agent already shut down");
                return State::Done(Outcome::AgentTerminated);
            }
        };

        tracing::info!(signal = %signal, "Caught signal");

        match signal {
            Signal::Hangup => {
                tracing::info!("Configuration reload is not supported, ignoring");
                State::Waiting
            }
            Signal::Interrupt | Signal::Terminate => State::Draining,
            other => {
                tracing::warn!(signal = %other, "Not a graceful signal, exiting");
                State::Done(Outcome::FailFast(other))
            }
        }
    }

    async fn drain(&mut self) -> Outcome {
        tracing::info!(grace = ?self.grace, "Gracefully shutting down agent");

        let agent = Arc::clone(&self.agent);
        let mut shutdown = tokio::spawn(async move { agent.shutdown().await });
        let grace = tokio::time::sleep(self.grace);

        tokio::select! {
            signal = self.next_signal() => {
                tracing::warn!(signal = %signal, "Second signal while draining, exiting");
                Outcome::Aborted(signal)
            }
            _ = grace => {
                tracing::warn!("Graceful shutdown timed out");
                Outcome::GraceExpired
            }
            result = &mut shutdown => match result {
                Ok(Ok(())) => Outcome::Drained,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Graceful shutdown failed");
                    Outcome::ShutdownFailed
                }
                Err(e) => {
                    tracing::error!(error = %e, "Shutdown task failed");
                    Outcome::ShutdownFailed
                }
            },
        }
    }
}
