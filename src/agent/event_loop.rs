//! Event consumption loop.
//!
//! Runs for the agent's whole running lifetime and only logs what it sees.
//! Reacting to membership changes (rebalancing, scheduling) would hook in
//! at [`EventLoop::handle`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::agent::ShutdownState;
use crate::lifecycle::ShutdownSignal;
use crate::membership::Event;
use crate::observability::metrics;

pub(crate) struct EventLoop {
    node_name: String,
    events: mpsc::Receiver<Event>,
    service_shutdown: ShutdownSignal,
    state: Arc<ShutdownState>,
}

impl EventLoop {
    pub(crate) fn new(
        node_name: String,
        events: mpsc::Receiver<Event>,
        service_shutdown: ShutdownSignal,
        state: Arc<ShutdownState>,
    ) -> Self {
        Self {
            node_name,
            events,
            service_shutdown,
            state,
        }
    }

    /// Consume events until the membership service shuts down.
    ///
    /// Events still buffered when the shutdown is noticed are dropped.
    pub(crate) async fn run(mut self) {
        tracing::info!("Listening for events");

        let mut events_open = true;
        loop {
            tokio::select! {
                event = self.events.recv(), if events_open => match event {
                    Some(event) => self.handle(&event),
                    None => {
                        tracing::debug!("Event channel closed");
                        events_open = false;
                    }
                },
                _ = self.service_shutdown.wait() => {
                    tracing::warn!("Membership shutdown detected, quitting");
                    if self.state.service_stopped() {
                        metrics::record_shutdown("service_stopped");
                    }
                    return;
                }
            }
        }
    }

    fn handle(&self, event: &Event) {
        tracing::info!(event = %event, "Received event");

        match event {
            Event::Member(member_event) => {
                metrics::record_member_event(member_event.event_type.as_str());
                for member in &member_event.members {
                    tracing::debug!(
                        node = %self.node_name,
                        member = %member.name,
                        status = %member.status,
                        event = %member_event.event_type,
                        "Member event"
                    );
                }
            }
            Event::User(user_event) => {
                metrics::record_user_event();
                tracing::debug!(
                    name = %user_event.name,
                    ltime = user_event.ltime,
                    payload_bytes = user_event.payload.len(),
                    "User event"
                );
            }
        }
    }
}
