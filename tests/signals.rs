//! Process signals through the controller. Kept in its own binary since
//! signals reach every test in a process.

#![cfg(unix)]

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use gcron::agent::Agent;
use gcron::config::AgentConfig;
use gcron::lifecycle::{signals, LifecycleController, Outcome};

mod common;
use common::{Mock, MockProvider};

fn raise(flag: &str) {
    let status = std::process::Command::new("kill")
        .args([flag, &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn test_interrupt_signal_exits_zero() {
    let (provider, mock) = MockProvider::new(Mock {
        leave_delay: Duration::from_millis(50),
        ..Mock::default()
    });
    let config = AgentConfig {
        profile: "local".into(),
        bind: "127.0.0.1".into(),
        ..AgentConfig::default()
    };
    let agent = Arc::new(Agent::with_provider(config, provider));
    agent.start().await.unwrap();

    let controller = LifecycleController::new(Arc::clone(&agent), signals::listen().unwrap());
    let running = tokio::spawn(controller.run());

    raise("-INT");
    let outcome = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("controller finishes")
        .unwrap();

    assert_eq!(outcome, Outcome::Drained);
    assert_eq!(format!("{:?}", outcome.exit_code()), format!("{:?}", ExitCode::SUCCESS));
    assert_eq!(mock.leave_calls(), 1);
    assert!(agent.shutdown_signal().is_fired());
}
