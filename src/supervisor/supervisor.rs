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

use crate::config::EndpointConfig;
use crate::protocol::{ProtocolHandle, ProtocolRegistry};
use crate::retry::{DisconnectCause, RetryPolicy};
use crate::supervisor::machine::{ConnectOutcome, LossOutcome, ShutdownOutcome, SupervisorMachine};
use crate::supervisor::{StopReason, SupervisorError, SupervisorState};
use crate::transport::{Connector, Link};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Supervises the lifecycle of one endpoint's connection.
///
/// The supervisor owns the retry loop: it asks the [`Connector`] for a
/// link, delivers lifecycle hooks to the endpoint's [`ProtocolHandle`],
/// and on failure or loss consults the configured retry policy to decide
/// whether to wait and try again or stop. A fresh handle is resolved from
/// the registry for every `start()` and for every unattended retry, so a
/// protocol implementation never sees two connections.
///
/// Cloning is cheap and all clones drive the same lifecycle.
#[derive(Clone)]
pub struct ConnectionSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    config: EndpointConfig,
    registry: Arc<ProtocolRegistry>,
    connector: Arc<dyn Connector>,
    machine: Mutex<SupervisorMachine>,
    handle_slot: Mutex<Option<Arc<dyn ProtocolHandle>>>,
    retry_timer: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ConnectionSupervisor {
    /// Creates a supervisor for `config`, initially [`SupervisorState::Idle`].
    pub fn new(
        config: EndpointConfig,
        registry: Arc<ProtocolRegistry>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let policy = RetryPolicy::from(&config.retry);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                registry,
                connector,
                machine: Mutex::new(SupervisorMachine::new(policy)),
                handle_slot: Mutex::new(None),
                retry_timer: Mutex::new(None),
                shutdown_tx,
            }),
        }
    }

    /// Name of the supervised endpoint.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// The endpoint configuration this supervisor was created with.
    pub fn config(&self) -> &EndpointConfig {
        &self.inner.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.inner.machine.lock().state()
    }

    /// Attempts made since the last successful connection.
    pub fn attempt_count(&self) -> u32 {
        self.inner.machine.lock().attempt_count()
    }

    /// Why the supervisor stopped, if it is stopped.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.inner.machine.lock().stop_reason()
    }

    /// Starts (or restarts) the connection lifecycle.
    ///
    /// Resolves a fresh protocol handle, resets the retry accounting and
    /// the shutdown flag, and launches the first connection attempt in the
    /// background. Legal only while `Idle` or `Stopped`; returns
    /// [`SupervisorError::InvalidState`] otherwise, and a resolution
    /// failure leaves the state untouched.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        self.inner.machine.lock().ensure_startable()?;

        if self.inner.config.address.is_empty() {
            return Err(SupervisorError::Configuration {
                reason: format!("endpoint '{}' has no address", self.inner.config.name),
            });
        }
        let handle = self.inner.registry.resolve(&self.inner.config)?;

        // Re-validates under the lock; a concurrent start loses here.
        let epoch = self.inner.machine.lock().start()?;
        self.inner.shutdown_tx.send_replace(false);

        info!(
            endpoint = %self.inner.config.name,
            protocol = %self.inner.config.protocol_type,
            address = %self.inner.config.address,
            "starting connection supervisor"
        );

        Inner::install_handle(&self.inner, handle).await;
        Inner::spawn_attempt(Arc::clone(&self.inner), epoch);
        Ok(())
    }

    /// Requests an orderly shutdown.
    ///
    /// Idempotent and effective from any state: a pending retry timer is
    /// cancelled, a connection attempt in flight is torn down when it
    /// terminates, and a live connection is closed. Once requested, the
    /// decision is never reversed until the next `start()`, no matter
    /// which in-flight events race with it.
    pub async fn request_shutdown(&self) {
        let outcome = self.inner.machine.lock().request_shutdown();

        let handle = match outcome {
            ShutdownOutcome::AlreadyStopped => {
                debug!(endpoint = %self.inner.config.name, "shutdown requested while stopped");
                return;
            }
            ShutdownOutcome::TimerCancelled => {
                if let Some(timer) = self.inner.retry_timer.lock().take() {
                    timer.abort();
                }
                info!(endpoint = %self.inner.config.name, "shutdown cancelled pending retry");
                self.inner.handle_slot.lock().take()
            }
            ShutdownOutcome::Deferred => {
                info!(
                    endpoint = %self.inner.config.name,
                    "shutdown requested, closing connection"
                );
                // Left in the slot so the terminating link can still
                // deliver its loss hook.
                self.inner.handle_slot.lock().clone()
            }
            ShutdownOutcome::Stopped => {
                info!(endpoint = %self.inner.config.name, "shutdown requested while idle");
                self.inner.handle_slot.lock().take()
            }
        };

        if let Some(handle) = handle {
            if let Err(cause) = handle.shutdown().await {
                warn!(
                    endpoint = %self.inner.config.name,
                    %cause,
                    "protocol shutdown hook failed"
                );
            }
        }

        // Wakes the link task, which drives the machine to Stopped.
        self.inner.shutdown_tx.send_replace(true);
    }
}

impl Inner {
    /// Replaces the protocol handle for a new attempt, giving the old one
    /// its shutdown hook.
    async fn install_handle(inner: &Arc<Inner>, handle: Arc<dyn ProtocolHandle>) {
        debug!(
            endpoint = %inner.config.name,
            protocol = handle.protocol_type(),
            "protocol handle installed"
        );
        let old = inner.handle_slot.lock().replace(handle);
        if let Some(old) = old {
            if let Err(cause) = old.shutdown().await {
                debug!(
                    endpoint = %inner.config.name,
                    %cause,
                    "shutdown hook on replaced handle failed"
                );
            }
        }
    }

    fn spawn_attempt(inner: Arc<Inner>, epoch: u64) {
        tokio::spawn(async move {
            Inner::run_attempt(inner, epoch).await;
        });
    }

    async fn run_attempt(inner: Arc<Inner>, epoch: u64) {
        debug!(
            endpoint = %inner.config.name,
            address = %inner.config.address,
            "attempting connection"
        );
        match inner.connector.attempt(&inner.config).await {
            Ok(link) => Inner::run_link(inner, epoch, link).await,
            Err(cause) => {
                warn!(
                    endpoint = %inner.config.name,
                    %cause,
                    recoverable = cause.is_recoverable(),
                    "connection attempt failed"
                );
                Inner::handle_loss(&inner, epoch, DisconnectCause::Failure).await;
            }
        }
    }

    async fn run_link(inner: Arc<Inner>, epoch: u64, mut link: Box<dyn Link>) {
        let outcome = inner.machine.lock().connect_succeeded(epoch);
        match outcome {
            ConnectOutcome::Discard => {
                debug!(endpoint = %inner.config.name, "discarding superseded connection");
                let _ = link.shutdown().await;
                return;
            }
            ConnectOutcome::TearDown => {
                info!(
                    endpoint = %inner.config.name,
                    "connection completed during shutdown, closing"
                );
                let _ = link.shutdown().await;
                // The handle already received its shutdown hook and was
                // never connected; retire it without further hooks.
                inner.handle_slot.lock().take();
                return;
            }
            ConnectOutcome::Proceed => {}
        }

        info!(
            endpoint = %inner.config.name,
            peer = ?link.peer_addr(),
            "connection established"
        );
        let handle = inner.handle_slot.lock().clone();
        if let Some(handle) = &handle {
            if let Err(cause) = handle.on_connected().await {
                warn!(endpoint = %inner.config.name, %cause, "on_connected hook failed");
            }
        }

        let mut shutdown_rx = inner.shutdown_tx.subscribe();
        let loss = tokio::select! {
            cause = link.closed() => Some(cause),
            _ = shutdown_rx.wait_for(|stop| *stop) => None,
        };
        let _ = link.shutdown().await;

        if let Some(cause) = &loss {
            warn!(endpoint = %inner.config.name, %cause, "connection lost");
        }
        // On the shutdown path (None) the loss event still delivers the
        // on_connection_lost hook before finalizing the machine.
        Inner::handle_loss(&inner, epoch, DisconnectCause::Drop).await;
    }

    /// Runs the failure/loss hook, then consults the machine and arms the
    /// retry timer if it asks for one.
    async fn handle_loss(inner: &Arc<Inner>, epoch: u64, cause: DisconnectCause) {
        let expected = match cause {
            DisconnectCause::Failure => SupervisorState::Connecting,
            DisconnectCause::Drop => SupervisorState::Connected,
        };
        if !inner.machine.lock().is_current(epoch, expected) {
            debug!(endpoint = %inner.config.name, "discarding superseded loss event");
            return;
        }

        // Hooks run outside the machine lock and never affect the
        // transition.
        let handle = inner.handle_slot.lock().clone();
        if let Some(handle) = &handle {
            let hook = match cause {
                DisconnectCause::Failure => handle.on_connection_failed().await,
                DisconnectCause::Drop => handle.on_connection_lost().await,
            };
            if let Err(cause) = hook {
                warn!(endpoint = %inner.config.name, %cause, "lifecycle hook failed");
            }
        }

        let outcome = {
            let mut machine = inner.machine.lock();
            let outcome = match cause {
                DisconnectCause::Failure => machine.connection_failed(epoch),
                DisconnectCause::Drop => machine.connection_lost(epoch),
            };
            if let LossOutcome::ScheduleRetry { delay, .. } = &outcome {
                // Armed while the machine lock is held so a shutdown
                // cannot slip between the transition and the timer.
                let delay = *delay;
                let armed_epoch = machine.epoch();
                let task_inner = Arc::clone(inner);
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    Inner::retry_fired(task_inner, armed_epoch).await;
                });
                if let Some(stale) = inner.retry_timer.lock().replace(timer) {
                    stale.abort();
                }
            }
            outcome
        };

        match outcome {
            LossOutcome::ScheduleRetry {
                delay,
                attempt,
                max_attempts,
            } => {
                warn!(
                    endpoint = %inner.config.name,
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs(),
                    "reconnecting after delay"
                );
            }
            LossOutcome::Stopped { reason } => match &reason {
                StopReason::RetriesExhausted { attempts } => {
                    error!(
                        endpoint = %inner.config.name,
                        attempts,
                        "giving up, retry attempts exhausted"
                    );
                }
                StopReason::RetryDisabled { cause } => {
                    info!(
                        endpoint = %inner.config.name,
                        %cause,
                        "not reconnecting, retry disabled for this cause"
                    );
                }
                _ => {
                    // Shutdown path: the handle had its shutdown hook in
                    // request_shutdown and is done after the loss hook.
                    inner.handle_slot.lock().take();
                    info!(endpoint = %inner.config.name, "supervisor stopped");
                }
            },
            LossOutcome::Discard => {
                debug!(endpoint = %inner.config.name, "discarding superseded loss event");
            }
        }
    }

    async fn retry_fired(inner: Arc<Inner>, epoch: u64) {
        let next = inner.machine.lock().retry_timer_fired(epoch);
        inner.retry_timer.lock().take();

        let Some(next_epoch) = next else {
            debug!(endpoint = %inner.config.name, "ignoring superseded retry timer");
            return;
        };

        info!(endpoint = %inner.config.name, "retry timer fired, reconnecting");
        match inner.registry.resolve(&inner.config) {
            Ok(handle) => {
                Inner::install_handle(&inner, handle).await;
                Inner::spawn_attempt(inner, next_epoch);
            }
            Err(cause) => {
                // No caller to report to on the retry path; record the
                // reason and stop.
                error!(
                    endpoint = %inner.config.name,
                    %cause,
                    "protocol resolution failed on retry, stopping"
                );
                inner
                    .machine
                    .lock()
                    .fail_resolution(next_epoch, cause.to_string());
            }
        }
    }
}
