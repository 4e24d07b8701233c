//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Defaults + config file → Agent::new → Agent::start
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGHUP/SIGQUIT → Signal channel
//!
//! Controller (controller.rs):
//!     Signal channel + agent shutdown signal
//!     → Agent::shutdown raced against the grace period
//!     → Outcome → process exit code
//!
//! Shutdown (shutdown.rs):
//!     One-shot broadcast observed by any number of waiters
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown has timeout: exit after the grace period, leave keeps running
//! - SIGHUP is accepted but reload is not implemented

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use controller::{LifecycleController, Outcome};
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
pub use signals::Signal;
