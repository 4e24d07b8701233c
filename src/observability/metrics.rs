//! Metrics collection.
//!
//! # Metrics
//! - `gcron_member_events_total` (counter): member events by `type`
//! - `gcron_user_events_total` (counter): user events received
//! - `gcron_agent_shutdowns_total` (counter): shutdowns by `outcome`

/// Record one member event delivered to the agent.
pub fn record_member_event(event_type: &'static str) {
    ::metrics::counter!("gcron_member_events_total", "type" => event_type).increment(1);
}

/// Record one user event delivered to the agent.
pub fn record_user_event() {
    ::metrics::counter!("gcron_user_events_total").increment(1);
}

/// Record how an agent shutdown ended (`left`, `leave_failed`, `service_stopped`).
pub fn record_shutdown(outcome: &'static str) {
    ::metrics::counter!("gcron_agent_shutdowns_total", "outcome" => outcome).increment(1);
}
