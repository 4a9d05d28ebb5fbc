//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! End-to-end supervisor lifecycle tests over the in-memory connector.
//!
//! These run on a paused tokio clock, so retry delays elapse instantly
//! while their ordering is preserved.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tether::transport::{MemoryConnector, ScriptedOutcome};
use tether::{
    ConnectionSupervisor, Connector, EndpointConfig, HandleError, ProtocolHandle,
    ProtocolRegistry, RetrySettings, StopReason, SupervisorState,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every lifecycle hook delivered to it, shared across the fresh
/// handles the factory produces.
struct RecordingHandle {
    events: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl ProtocolHandle for RecordingHandle {
    fn protocol_type(&self) -> &str {
        "recording"
    }

    async fn on_connected(&self) -> Result<(), HandleError> {
        self.events.lock().push("connected");
        Ok(())
    }

    async fn on_connection_lost(&self) -> Result<(), HandleError> {
        self.events.lock().push("lost");
        Ok(())
    }

    async fn on_connection_failed(&self) -> Result<(), HandleError> {
        self.events.lock().push("failed");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), HandleError> {
        self.events.lock().push("shutdown");
        Ok(())
    }
}

struct Fixture {
    supervisor: ConnectionSupervisor,
    connector: Arc<MemoryConnector>,
    events: Arc<Mutex<Vec<&'static str>>>,
}

fn fixture(retry: RetrySettings) -> Fixture {
    init_tracing();
    let events = Arc::new(Mutex::new(Vec::new()));
    let registry = Arc::new(ProtocolRegistry::new());
    let factory_events = Arc::clone(&events);
    registry.register("recording", move |_endpoint: &EndpointConfig| {
        Ok(Arc::new(RecordingHandle {
            events: Arc::clone(&factory_events),
        }) as Arc<dyn ProtocolHandle>)
    });

    let connector = Arc::new(MemoryConnector::new());
    let config = EndpointConfig::new("test", "recording", "127.0.0.1:6667").with_retry(retry);
    let supervisor =
        ConnectionSupervisor::new(config, registry, connector.clone() as Arc<dyn Connector>);
    Fixture {
        supervisor,
        connector,
        events,
    }
}

async fn wait_for_state(supervisor: &ConnectionSupervisor, state: SupervisorState) {
    // Each poll advances the paused clock by 1ms, so the bound must give
    // multiple full retry delays room to elapse.
    for _ in 0..50_000 {
        if supervisor.state() == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!(
        "supervisor never reached {state}, still {current}",
        current = supervisor.state()
    );
}

fn retry(delay: u64, attempts: u32) -> RetrySettings {
    RetrySettings {
        delay,
        attempts,
        ..RetrySettings::default()
    }
}

/// With two retries allowed, three straight failures wait out two delays
/// and then stop with the attempt count at three.
#[tokio::test(start_paused = true)]
async fn test_exhausts_retries_after_repeated_failures() {
    let f = fixture(retry(10, 2));
    let started = tokio::time::Instant::now();

    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(f.connector.attempts_made(), 3);
    assert_eq!(f.supervisor.attempt_count(), 3);
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::RetriesExhausted { attempts: 3 })
    );
    // Two full retry delays elapsed on the paused clock. Each retry
    // resolves a fresh handle, retiring the previous one.
    assert!(started.elapsed() >= Duration::from_secs(20));
    assert_eq!(
        *f.events.lock(),
        vec!["failed", "shutdown", "failed", "shutdown", "failed"]
    );
}

/// A successful connection resets the attempt counter, so the budget is
/// fresh when the connection later drops.
#[tokio::test(start_paused = true)]
async fn test_attempt_counter_resets_on_success() {
    let f = fixture(retry(5, 1));
    f.connector
        .script([ScriptedOutcome::Fail, ScriptedOutcome::Connect]);

    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Connected).await;
    assert_eq!(f.supervisor.attempt_count(), 0);

    // Drop the live link: attempt 1 of a fresh budget, which retries, and
    // the exhausted script fails attempt 2, which stops.
    f.connector.drop_active();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(f.connector.attempts_made(), 3);
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::RetriesExhausted { attempts: 2 })
    );
    assert_eq!(
        *f.events.lock(),
        vec!["failed", "shutdown", "connected", "lost", "shutdown", "failed"]
    );
}

/// With retry-on-drop disabled, a lost connection stops immediately.
#[tokio::test(start_paused = true)]
async fn test_retry_on_drop_disabled() {
    let f = fixture(RetrySettings {
        on_drop: false,
        ..retry(5, 5)
    });
    f.connector.script([ScriptedOutcome::Connect]);

    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Connected).await;

    f.connector.drop_active();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(f.connector.attempts_made(), 1);
    assert!(matches!(
        f.supervisor.stop_reason(),
        Some(StopReason::RetryDisabled { .. })
    ));
    assert_eq!(*f.events.lock(), vec!["connected", "lost"]);
}

/// Shutdown during the reconnect wait cancels the pending retry; no
/// further attempt is made even long after the delay would have fired.
#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_retry() {
    let f = fixture(retry(60, 5));

    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::ReconnectWait).await;
    assert_eq!(f.connector.attempts_made(), 1);

    f.supervisor.request_shutdown().await;
    assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(f.connector.attempts_made(), 1);
    assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
}

/// A shutdown requested while an attempt is in flight wins the race: the
/// late success is torn down and `on_connected` never fires.
#[tokio::test(start_paused = true)]
async fn test_shutdown_supersedes_in_flight_attempt() {
    let f = fixture(retry(5, 5));
    f.connector.script([ScriptedOutcome::Connect]);
    f.connector.hold_attempts();

    f.supervisor.start().await.unwrap();
    // Let the attempt task reach the gate.
    while f.connector.attempts_made() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    f.supervisor.request_shutdown().await;
    f.connector.release_attempt();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );
    // Only the shutdown hook ran; the superseded success produced nothing.
    assert_eq!(*f.events.lock(), vec!["shutdown"]);
}

/// Shutdown of a live connection closes it and stops without a retry.
/// The handle still receives `on_connection_lost` when its link goes
/// down, after the shutdown hook.
#[tokio::test(start_paused = true)]
async fn test_shutdown_while_connected() {
    let f = fixture(retry(5, 5));
    f.connector.script([ScriptedOutcome::Connect]);

    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Connected).await;

    f.supervisor.request_shutdown().await;
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(f.connector.attempts_made(), 1);
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );
    assert_eq!(*f.events.lock(), vec!["connected", "shutdown", "lost"]);
}

/// A shutdown deferred past an in-flight attempt still delivers the
/// failure hook when the attempt terminates.
#[tokio::test(start_paused = true)]
async fn test_shutdown_while_connecting_delivers_failure_hook() {
    let f = fixture(retry(5, 5));
    f.connector.hold_attempts();

    f.supervisor.start().await.unwrap();
    while f.connector.attempts_made() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    f.supervisor.request_shutdown().await;
    // The released attempt fails (empty script) and finalizes the stop.
    f.connector.release_attempt();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );
    assert_eq!(*f.events.lock(), vec!["shutdown", "failed"]);
}

/// `request_shutdown` is idempotent.
#[tokio::test(start_paused = true)]
async fn test_shutdown_is_idempotent() {
    let f = fixture(retry(5, 5));

    f.supervisor.start().await.unwrap();
    f.supervisor.request_shutdown().await;
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;

    f.supervisor.request_shutdown().await;
    assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );
}

/// A stopped supervisor can be started again with fresh accounting.
#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
    let f = fixture(retry(5, 0));

    // Zero retries: the first failure stops the supervisor.
    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;
    assert_eq!(
        f.supervisor.stop_reason(),
        Some(StopReason::RetriesExhausted { attempts: 1 })
    );

    f.connector.script([ScriptedOutcome::Connect]);
    f.supervisor.start().await.unwrap();
    wait_for_state(&f.supervisor, SupervisorState::Connected).await;

    assert_eq!(f.supervisor.attempt_count(), 0);
    assert_eq!(f.supervisor.stop_reason(), None);

    f.supervisor.request_shutdown().await;
    wait_for_state(&f.supervisor, SupervisorState::Stopped).await;
}
