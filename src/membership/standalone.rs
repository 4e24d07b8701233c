//! Single-node membership backend.
//!
//! Reserves the gossip bind address and reports only the local node: its
//! join when the service starts and its leave when it stops. It carries no
//! gossip protocol, so other nodes are never discovered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::lifecycle::{ShutdownSignal, ShutdownTrigger};
use crate::membership::coalesce::MemberCoalescer;
use crate::membership::{
    Event, Member, MemberEvent, MemberEventType, MemberStatus, MembershipError,
    MembershipProvider, MembershipService, ServiceConfig,
};

/// Creates [`StandaloneService`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandaloneProvider;

impl MembershipProvider for StandaloneProvider {
    type Service = StandaloneService;

    async fn create(&self, config: ServiceConfig) -> Result<StandaloneService, MembershipError> {
        StandaloneService::start(config).await
    }
}

pub struct StandaloneService {
    local: Mutex<Member>,
    _socket: UdpSocket,
    event_tx: mpsc::Sender<Event>,
    coalescer: MemberCoalescer,
    leaving: AtomicBool,
    shutdown: ShutdownTrigger,
}

impl StandaloneService {
    async fn start(config: ServiceConfig) -> Result<Self, MembershipError> {
        let socket = UdpSocket::bind(config.bind)
            .await
            .map_err(|source| MembershipError::Bind {
                addr: config.bind,
                source,
            })?;
        let local_addr = socket.local_addr()?;

        let name = if config.node_name.is_empty() {
            format!("node-{}", Uuid::new_v4())
        } else {
            config.node_name
        };

        tracing::debug!(
            preset = ?config.preset,
            member_coalesce = ?config.member_coalesce.period,
            user_coalesce = ?config.user_coalesce.period,
            reconnect_timeout = ?config.reconnect_timeout,
            "Membership tuning"
        );

        let local = Member {
            name,
            addr: local_addr.ip(),
            port: local_addr.port(),
            tags: config.tags,
            status: MemberStatus::Alive,
        };

        let shutdown = ShutdownTrigger::new();
        let coalescer = MemberCoalescer::spawn(
            config.member_coalesce,
            config.event_tx.clone(),
            shutdown.subscribe(),
        );

        coalescer
            .send(MemberEvent {
                event_type: MemberEventType::Join,
                members: vec![local.clone()],
            })
            .await;

        tracing::info!(
            node = %local.name,
            address = %local_addr,
            "Standalone membership started"
        );

        Ok(Self {
            local: Mutex::new(local),
            _socket: socket,
            event_tx: config.event_tx,
            coalescer,
            leaving: AtomicBool::new(false),
            shutdown,
        })
    }

    /// Name the local node is known by.
    pub fn local_name(&self) -> String {
        self.local.lock().expect("local member mutex poisoned").name.clone()
    }

    fn set_status(&self, status: MemberStatus) -> Member {
        let mut local = self.local.lock().expect("local member mutex poisoned");
        local.status = status;
        local.clone()
    }
}

impl MembershipService for StandaloneService {
    fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    async fn leave(&self) -> Result<(), MembershipError> {
        if self.leaving.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tracing::info!("Leaving cluster");
        let member = self.set_status(MemberStatus::Left);

        // Leave notifications skip coalescing; a full channel drops it.
        let event = Event::Member(MemberEvent {
            event_type: MemberEventType::Leave,
            members: vec![member],
        });
        if let Err(e) = self.event_tx.try_send(event) {
            tracing::debug!(error = %e, "Leave event not delivered");
        }

        self.coalescer.abort();
        self.shutdown.trigger();
        Ok(())
    }

    fn members(&self) -> Vec<Member> {
        vec![self.local.lock().expect("local member mutex poisoned").clone()]
    }
}
