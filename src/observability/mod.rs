//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Agent, event loop, controller produce:
//!     → logging.rs (structured log events, `agent` span)
//!     → metrics.rs (event and shutdown counters)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG)
//!     → whatever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
