//! Lifecycle controller tests. Time is paused, so grace periods elapse
//! instantly once every task is idle.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use gcron::agent::Agent;
use gcron::config::AgentConfig;
use gcron::lifecycle::controller::GRACEFUL_TIMEOUT;
use gcron::lifecycle::{LifecycleController, Outcome, Signal};

mod common;
use common::{Mock, MockProvider};

async fn started(mock: Mock) -> (Arc<Agent<MockProvider>>, Arc<Mock>) {
    let (provider, mock) = MockProvider::new(mock);
    let config = AgentConfig {
        profile: "lan".into(),
        bind: "127.0.0.1".into(),
        ..AgentConfig::default()
    };
    let agent = Arc::new(Agent::with_provider(config, provider));
    agent.start().await.unwrap();
    (agent, mock)
}

fn controller(agent: &Arc<Agent<MockProvider>>) -> (LifecycleController<MockProvider>, mpsc::Sender<Signal>) {
    let (tx, rx) = mpsc::channel(4);
    (LifecycleController::new(Arc::clone(agent), rx), tx)
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_drains_within_grace() {
    let (agent, mock) = started(Mock {
        leave_delay: Duration::from_millis(500),
        ..Mock::default()
    })
    .await;
    let (controller, signals) = controller(&agent);

    signals.send(Signal::Interrupt).await.unwrap();
    let outcome = controller.run().await;

    assert_eq!(outcome, Outcome::Drained);
    assert!(outcome.is_success());
    assert_eq!(mock.leave_calls(), 1);
    assert!(agent.shutdown_signal().is_fired());
}

#[tokio::test(start_paused = true)]
async fn test_terminate_drains() {
    let (agent, _mock) = started(Mock::default()).await;
    let (controller, signals) = controller(&agent);

    signals.send(Signal::Terminate).await.unwrap();
    assert_eq!(controller.run().await, Outcome::Drained);
}

#[tokio::test(start_paused = true)]
async fn test_slow_leave_exceeds_grace() {
    let (agent, mock) = started(Mock {
        leave_delay: Duration::from_secs(5),
        ..Mock::default()
    })
    .await;
    let (controller, signals) = controller(&agent);

    let start = Instant::now();
    signals.send(Signal::Interrupt).await.unwrap();
    let outcome = controller.run().await;

    assert_eq!(outcome, Outcome::GraceExpired);
    assert!(!outcome.is_success());
    assert!(start.elapsed() >= GRACEFUL_TIMEOUT);
    assert!(start.elapsed() < Duration::from_secs(5));

    // The abandoned shutdown still completes on its own.
    agent.shutdown_signal().wait().await;
    assert_eq!(mock.leave_calls(), 1);
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_hangup_keeps_waiting() {
    let (agent, mock) = started(Mock::default()).await;
    let (controller, signals) = controller(&agent);
    let mut running = tokio::spawn(controller.run());

    signals.send(Signal::Hangup).await.unwrap();
    let still_waiting = tokio::time::timeout(Duration::from_secs(60), &mut running).await;
    assert!(still_waiting.is_err());
    assert!(agent.is_running());
    assert_eq!(mock.leave_calls(), 0);
    assert_eq!(agent.config().profile, "lan");

    signals.send(Signal::Terminate).await.unwrap();
    assert_eq!(running.await.unwrap(), Outcome::Drained);
}

#[tokio::test(start_paused = true)]
async fn test_quit_fails_fast() {
    let (agent, mock) = started(Mock::default()).await;
    let (controller, signals) = controller(&agent);

    signals.send(Signal::Quit).await.unwrap();
    let outcome = controller.run().await;

    assert_eq!(outcome, Outcome::FailFast(Signal::Quit));
    assert_eq!(mock.leave_calls(), 0);
    assert!(agent.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_second_signal_aborts_drain() {
    let (agent, _mock) = started(Mock {
        leave_delay: Duration::from_secs(2),
        ..Mock::default()
    })
    .await;
    let (controller, signals) = controller(&agent);

    signals.send(Signal::Interrupt).await.unwrap();
    signals.send(Signal::Interrupt).await.unwrap();

    assert_eq!(controller.run().await, Outcome::Aborted(Signal::Interrupt));
}

#[tokio::test(start_paused = true)]
async fn test_failed_leave_exits_non_zero() {
    let (agent, _mock) = started(Mock {
        fail_leave: true,
        ..Mock::default()
    })
    .await;
    let (controller, signals) = controller(&agent);

    signals.send(Signal::Terminate).await.unwrap();
    let outcome = controller.run().await;

    assert_eq!(outcome, Outcome::ShutdownFailed);
    assert!(!outcome.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_agent_terminated_while_waiting() {
    let (agent, mock) = started(Mock::default()).await;
    let (controller, _signals) = controller(&agent);

    mock.stop_service();
    let outcome = controller.run().await;

    assert_eq!(outcome, Outcome::AgentTerminated);
    assert!(outcome.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_closed_signal_channel_keeps_waiting() {
    let (agent, mock) = started(Mock::default()).await;
    let (controller, signals) = controller(&agent);
    drop(signals);

    let mut running = tokio::spawn(controller.run());
    let still_waiting = tokio::time::timeout(Duration::from_secs(60), &mut running).await;
    assert!(still_waiting.is_err());

    mock.stop_service();
    assert_eq!(running.await.unwrap(), Outcome::AgentTerminated);
}

#[test]
fn test_outcome_exit_codes() {
    let success = format!("{:?}", ExitCode::SUCCESS);
    let failure = format!("{:?}", ExitCode::FAILURE);

    for outcome in [Outcome::AgentTerminated, Outcome::Drained] {
        assert_eq!(format!("{:?}", outcome.exit_code()), success);
    }
    for outcome in [
        Outcome::FailFast(Signal::Quit),
        Outcome::Aborted(Signal::Interrupt),
        Outcome::GraceExpired,
        Outcome::ShutdownFailed,
    ] {
        assert_eq!(format!("{:?}", outcome.exit_code()), failure);
    }
}
