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

//! Supervisor lifecycle tests over real TCP connections.
//!
//! These use a zero-second retry delay so retries run back to back in
//! real time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tether::{
    ConnectionSupervisor, EndpointConfig, HandleError, ProtocolHandle, ProtocolRegistry,
    RetrySettings, StopReason, SupervisorState, TcpConnector,
};

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
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn supervisor(
    address: String,
    retry: RetrySettings,
) -> (ConnectionSupervisor, Arc<Mutex<Vec<&'static str>>>) {
    init_tracing();
    let events = Arc::new(Mutex::new(Vec::new()));
    let registry = Arc::new(ProtocolRegistry::new());
    let factory_events = Arc::clone(&events);
    registry.register("recording", move |_endpoint: &EndpointConfig| {
        Ok(Arc::new(RecordingHandle {
            events: Arc::clone(&factory_events),
        }) as Arc<dyn ProtocolHandle>)
    });

    let config = EndpointConfig::new("tcp-test", "recording", address).with_retry(retry);
    let supervisor = ConnectionSupervisor::new(config, registry, Arc::new(TcpConnector::new()));
    (supervisor, events)
}

async fn wait_for_state(supervisor: &ConnectionSupervisor, state: SupervisorState) {
    for _ in 0..2_000 {
        if supervisor.state() == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "supervisor never reached {state}, still {current}",
        current = supervisor.state()
    );
}

/// A port nothing is listening on.
async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}

#[tokio::test]
async fn test_refused_connections_exhaust_retries() {
    let (supervisor, events) = supervisor(
        dead_address().await,
        RetrySettings {
            delay: 0,
            attempts: 2,
            ..RetrySettings::default()
        },
    );

    supervisor.start().await.unwrap();
    wait_for_state(&supervisor, SupervisorState::Stopped).await;

    assert_eq!(
        supervisor.stop_reason(),
        Some(StopReason::RetriesExhausted { attempts: 3 })
    );
    assert_eq!(
        events.lock().iter().filter(|&&e| e == "failed").count(),
        3
    );
}

#[tokio::test]
async fn test_peer_close_with_retry_on_drop_disabled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    // Accept one connection and immediately close it.
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let (supervisor, events) = supervisor(
        address,
        RetrySettings {
            delay: 0,
            attempts: 5,
            on_drop: false,
            ..RetrySettings::default()
        },
    );

    supervisor.start().await.unwrap();
    wait_for_state(&supervisor, SupervisorState::Stopped).await;

    assert!(matches!(
        supervisor.stop_reason(),
        Some(StopReason::RetryDisabled { .. })
    ));
    assert_eq!(*events.lock(), vec!["connected", "lost"]);
}

#[tokio::test]
async fn test_shutdown_closes_live_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    // Hold the accepted socket and report when the peer goes away.
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = [0u8; 64];
        socket.read(&mut buffer).await.unwrap()
    });

    let (supervisor, events) = supervisor(
        address,
        RetrySettings {
            delay: 0,
            attempts: 5,
            ..RetrySettings::default()
        },
    );

    supervisor.start().await.unwrap();
    wait_for_state(&supervisor, SupervisorState::Connected).await;

    supervisor.request_shutdown().await;
    wait_for_state(&supervisor, SupervisorState::Stopped).await;
    assert_eq!(
        supervisor.stop_reason(),
        Some(StopReason::ShutdownRequested)
    );
    // The loss hook is still delivered when the link is torn down.
    assert_eq!(*events.lock(), vec!["connected", "lost"]);

    // The server sees a clean close, not more data.
    let read = server.await.unwrap();
    assert_eq!(read, 0);
}
