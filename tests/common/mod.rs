//! Shared utilities for integration testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gcron::lifecycle::{ShutdownSignal, ShutdownTrigger};
use gcron::membership::{
    Event, Member, MembershipError, MembershipProvider, MembershipService, ServiceConfig,
};

/// Scripted membership backend shared between a provider and its service.
#[derive(Default)]
pub struct Mock {
    pub create_delay: Duration,
    pub leave_delay: Duration,
    pub fail_create: bool,
    pub fail_leave: bool,
    pub leave_calls: AtomicUsize,
    pub config: Mutex<Option<ServiceConfig>>,
    pub trigger: ShutdownTrigger,
}

#[allow(dead_code)]
impl Mock {
    pub fn leave_calls(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }

    /// The config the agent handed to `create`.
    pub fn service_config(&self) -> ServiceConfig {
        self.config
            .lock()
            .unwrap()
            .clone()
            .expect("service was not created")
    }

    /// Whether `create` was never reached.
    pub fn config_is_empty(&self) -> bool {
        self.config.lock().unwrap().is_none()
    }

    /// Push an event as the gossip layer would.
    pub async fn emit(&self, event: Event) {
        self.service_config().event_tx.send(event).await.unwrap();
    }

    /// Events still waiting in the agent's channel.
    pub fn queued_events(&self) -> usize {
        let tx = self.service_config().event_tx;
        tx.max_capacity() - tx.capacity()
    }

    /// Simulate the service failing on its own.
    pub fn stop_service(&self) {
        self.trigger.trigger();
    }
}

#[derive(Clone)]
pub struct MockProvider(pub Arc<Mock>);

#[allow(dead_code)]
impl MockProvider {
    pub fn new(mock: Mock) -> (Self, Arc<Mock>) {
        let mock = Arc::new(mock);
        (Self(Arc::clone(&mock)), mock)
    }
}

pub struct MockService(Arc<Mock>);

impl MembershipProvider for MockProvider {
    type Service = MockService;

    async fn create(&self, config: ServiceConfig) -> Result<MockService, MembershipError> {
        tokio::time::sleep(self.0.create_delay).await;
        if self.0.fail_create {
            return Err(MembershipError::Service("create refused".into()));
        }
        *self.0.config.lock().unwrap() = Some(config);
        Ok(MockService(Arc::clone(&self.0)))
    }
}

impl MembershipService for MockService {
    fn shutdown_signal(&self) -> ShutdownSignal {
        self.0.trigger.subscribe()
    }

    async fn leave(&self) -> Result<(), MembershipError> {
        self.0.leave_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.0.leave_delay).await;
        if self.0.fail_leave {
            return Err(MembershipError::Service("leave refused".into()));
        }
        self.0.trigger.trigger();
        Ok(())
    }

    fn members(&self) -> Vec<Member> {
        Vec::new()
    }
}
