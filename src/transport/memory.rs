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

//! In-memory connector implementation for testing.
//!
//! This module provides a scriptable connector that produces deterministic
//! attempt outcomes without any network I/O. It is the workhorse of the
//! supervisor's lifecycle tests: attempts can be made to fail or succeed in
//! a chosen order, live links can be dropped on demand, and attempts can be
//! held open to exercise races with shutdown.

use crate::config::EndpointConfig;
use crate::transport::{Connector, Link, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Outcome of one scripted connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// The attempt fails with a connection-refused style error.
    Fail,
    /// The attempt succeeds with a [`MemoryLink`].
    Connect,
}

/// Scriptable in-memory implementation of [`Connector`].
///
/// Outcomes are consumed from a queue, one per attempt; once the script is
/// exhausted every further attempt fails. The most recently produced link
/// can be dropped from the test side with [`MemoryConnector::drop_active`],
/// and [`MemoryConnector::hold_attempts`] gates attempts so a test can
/// interleave other operations while an attempt is in flight.
///
/// # Examples
///
/// ```rust
/// use tether::transport::{MemoryConnector, ScriptedOutcome};
/// use tether::{Connector, EndpointConfig};
///
/// # async fn example() {
/// let connector = MemoryConnector::new();
/// connector.script([ScriptedOutcome::Fail, ScriptedOutcome::Connect]);
///
/// let config = EndpointConfig::new("test", "echo", "");
/// assert!(connector.attempt(&config).await.is_err());
/// assert!(connector.attempt(&config).await.is_ok());
/// assert_eq!(connector.attempts_made(), 2);
/// # }
/// ```
#[derive(Default)]
pub struct MemoryConnector {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    active: Mutex<Option<Arc<Notify>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    attempts: AtomicU32,
}

impl MemoryConnector {
    /// Creates a connector with an empty script.
    ///
    /// With no script, every attempt fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends outcomes to the script, consumed one per attempt.
    pub fn script(&self, outcomes: impl IntoIterator<Item = ScriptedOutcome>) {
        self.script.lock().extend(outcomes);
    }

    /// Returns how many attempts have been made so far.
    pub fn attempts_made(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Terminates the most recently produced link, as if the peer closed it.
    ///
    /// No-op if no link is live.
    pub fn drop_active(&self) {
        if let Some(trigger) = self.active.lock().as_ref() {
            trigger.notify_one();
        }
    }

    /// Holds every subsequent attempt until [`MemoryConnector::release_attempt`].
    ///
    /// While held, `attempt` does not resolve; this lets tests race other
    /// operations against an in-flight attempt.
    pub fn hold_attempts(&self) {
        *self.gate.lock() = Some(Arc::new(Notify::new()));
    }

    /// Releases one held attempt.
    pub fn release_attempt(&self) {
        if let Some(gate) = self.gate.lock().as_ref() {
            gate.notify_one();
        }
    }
}

#[async_trait::async_trait]
impl Connector for MemoryConnector {
    async fn attempt(&self, _endpoint: &EndpointConfig) -> Result<Box<dyn Link>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(ScriptedOutcome::Fail);
        match outcome {
            ScriptedOutcome::Fail => Err(TransportError::ConnectionFailed {
                address: "memory".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "scripted failure"),
            }),
            ScriptedOutcome::Connect => {
                let trigger = Arc::new(Notify::new());
                *self.active.lock() = Some(Arc::clone(&trigger));
                Ok(Box::new(MemoryLink {
                    trigger,
                    local_close: false,
                }))
            }
        }
    }
}

/// A live in-memory link produced by [`MemoryConnector`].
pub struct MemoryLink {
    trigger: Arc<Notify>,
    local_close: bool,
}

#[async_trait::async_trait]
impl Link for MemoryLink {
    async fn closed(&mut self) -> TransportError {
        if self.local_close {
            return TransportError::Closed;
        }
        self.trigger.notified().await;
        TransportError::ConnectionLost {
            reason: "peer closed the link".to_string(),
            source: None,
        }
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.local_close = true;
        self.trigger.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EndpointConfig {
        EndpointConfig::new("test", "echo", "")
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let connector = MemoryConnector::new();
        let result = connector.attempt(&config()).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionFailed { .. })
        ));
        assert_eq!(connector.attempts_made(), 1);
    }

    #[tokio::test]
    async fn test_script_order() {
        let connector = MemoryConnector::new();
        connector.script([ScriptedOutcome::Connect, ScriptedOutcome::Fail]);

        assert!(connector.attempt(&config()).await.is_ok());
        assert!(connector.attempt(&config()).await.is_err());
        // Exhausted script keeps failing.
        assert!(connector.attempt(&config()).await.is_err());
    }

    #[tokio::test]
    async fn test_drop_active_resolves_closed() {
        let connector = MemoryConnector::new();
        connector.script([ScriptedOutcome::Connect]);

        let mut link = connector.attempt(&config()).await.unwrap();
        connector.drop_active();
        let reason = link.closed().await;
        assert!(matches!(reason, TransportError::ConnectionLost { .. }));
    }

    #[tokio::test]
    async fn test_link_shutdown_resolves_closed() {
        let connector = MemoryConnector::new();
        connector.script([ScriptedOutcome::Connect]);

        let mut link = connector.attempt(&config()).await.unwrap();
        link.shutdown().await.unwrap();
        let reason = link.closed().await;
        assert!(matches!(reason, TransportError::Closed));
        assert!(!reason.is_recoverable());
    }

    #[tokio::test]
    async fn test_held_attempt_waits_for_release() {
        let connector = Arc::new(MemoryConnector::new());
        connector.script([ScriptedOutcome::Connect]);
        connector.hold_attempts();

        let pending = {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move { connector.attempt(&config()).await.is_ok() })
        };

        // The attempt is counted immediately but does not resolve yet.
        tokio::task::yield_now().await;
        assert_eq!(connector.attempts_made(), 1);
        assert!(!pending.is_finished());

        connector.release_attempt();
        assert!(pending.await.unwrap());
    }
}
