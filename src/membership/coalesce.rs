//! Member event coalescing.
//!
//! Rapid membership churn is folded into fewer deliveries: events are
//! buffered per member (latest change wins) and flushed once the stream has
//! been quiet for the quiescent period, or once the coalesce period has
//! passed since the first buffered event.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::lifecycle::ShutdownSignal;
use crate::membership::{CoalesceWindow, Event, Member, MemberEvent, MemberEventType};

const INPUT_CAPACITY: usize = 256;

/// Input side of a running member coalescer task.
pub struct MemberCoalescer {
    tx: mpsc::Sender<MemberEvent>,
    handle: JoinHandle<()>,
}

impl MemberCoalescer {
    /// Start a coalescer delivering to `out` until `shutdown` fires or `out`
    /// is closed.
    pub fn spawn(window: CoalesceWindow, out: mpsc::Sender<Event>, shutdown: ShutdownSignal) -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
        let handle = tokio::spawn(run(window, rx, out, shutdown));
        Self { tx, handle }
    }

    /// Queue an event. Returns `false` once the coalescer has stopped.
    pub async fn send(&self, event: MemberEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Stop the coalescer, dropping anything still buffered.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

async fn run(
    window: CoalesceWindow,
    mut input: mpsc::Receiver<MemberEvent>,
    out: mpsc::Sender<Event>,
    shutdown: ShutdownSignal,
) {
    let mut pending: BTreeMap<String, (MemberEventType, Member)> = BTreeMap::new();
    let mut deadline: Option<Instant> = None;
    let mut quiet: Option<Instant> = None;

    loop {
        let flush_at = match (deadline, quiet) {
            (Some(d), Some(q)) => Some(d.min(q)),
            (d, q) => d.or(q),
        };
        let flush_timer = async {
            match flush_at {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            event = input.recv() => match event {
                Some(event) if window.period.is_zero() => {
                    if out.send(Event::Member(event)).await.is_err() {
                        return;
                    }
                }
                Some(event) => {
                    let now = Instant::now();
                    for member in event.members {
                        pending.insert(member.name.clone(), (event.event_type, member));
                    }
                    deadline.get_or_insert(now + window.period);
                    quiet = Some(now + window.quiescent);
                }
                None => {
                    flush(&mut pending, &out).await;
                    return;
                }
            },
            _ = flush_timer => {
                deadline = None;
                quiet = None;
                if !flush(&mut pending, &out).await {
                    return;
                }
            }
            _ = shutdown.wait() => {
                tracing::debug!(dropped = pending.len(), "Member coalescer stopping");
                return;
            }
        }
    }
}

/// Deliver buffered changes, one event per type. Returns `false` if the
/// receiver is gone.
async fn flush(
    pending: &mut BTreeMap<String, (MemberEventType, Member)>,
    out: &mpsc::Sender<Event>,
) -> bool {
    let mut by_type: BTreeMap<MemberEventType, Vec<Member>> = BTreeMap::new();
    for (_, (event_type, member)) in std::mem::take(pending) {
        by_type.entry(event_type).or_default().push(member);
    }

    for (event_type, members) in by_type {
        tracing::trace!(event = %event_type, count = members.len(), "Flushing coalesced members");
        if out.send(Event::Member(MemberEvent { event_type, members })).await.is_err() {
            return false;
        }
    }
    true
}
