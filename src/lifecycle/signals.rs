//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGTERM, SIGHUP, SIGQUIT)
//! - Translate signals to [`Signal`] values on a bounded channel
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Deciding what a signal means is left to the controller

use std::fmt;

use tokio::sync::mpsc;

/// Buffered signals not yet seen by the controller.
const SIGNAL_BUFFER: usize = 4;

/// A process signal the agent reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
    /// Reload request.
    Hangup,
    Quit,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminated",
            Signal::Hangup => "hangup",
            Signal::Quit => "quit",
        };
        f.write_str(name)
    }
}

/// Start forwarding process signals to the returned channel.
#[cfg(unix)]
pub fn listen() -> std::io::Result<mpsc::Receiver<Signal>> {
    use tokio::signal::unix::{signal, SignalKind};

    let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
    let kinds = [
        (SignalKind::interrupt(), Signal::Interrupt),
        (SignalKind::terminate(), Signal::Terminate),
        (SignalKind::hangup(), Signal::Hangup),
        (SignalKind::quit(), Signal::Quit),
    ];

    for (kind, value) in kinds {
        let mut stream = signal(kind)?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                // Like a full OS pending set, extra signals are dropped.
                if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(value) {
                    break;
                }
            }
        });
    }

    Ok(rx)
}

/// Start forwarding process signals to the returned channel.
#[cfg(not(unix))]
pub fn listen() -> std::io::Result<mpsc::Receiver<Signal>> {
    let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(Signal::Interrupt) {
                break;
            }
        }
    });
    Ok(rx)
}
