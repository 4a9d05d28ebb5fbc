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

//! The supervisor's synchronous state machine.
//!
//! All lifecycle decisions live here, free of I/O: every operation mutates
//! the machine and returns an effect for the async shell to execute
//! (begin an attempt, arm the retry timer, stop, or discard a stale
//! event). Keeping the machine synchronous makes the transition table and
//! the lifecycle properties directly testable.
//!
//! Events carry the epoch of the attempt that produced them. An event
//! whose epoch does not match the machine's current epoch, or that arrives
//! in the wrong state, belongs to a superseded attempt and is discarded.

use crate::retry::{DisconnectCause, RetryDecision, RetryPolicy};
use crate::supervisor::{StopReason, SupervisorError, SupervisorState};
use std::time::Duration;

/// Effect of a connection-succeeded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConnectOutcome {
    /// Now connected; run the `on_connected` hook.
    Proceed,
    /// A shutdown was requested while the attempt was in flight; the shell
    /// tears the fresh link down and no hook runs.
    TearDown,
    /// Stale event from a superseded attempt; ignore it.
    Discard,
}

/// Effect of a connection-failed or connection-lost event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LossOutcome {
    /// Arm the one-shot retry timer.
    ScheduleRetry {
        /// Delay before the next attempt
        delay: Duration,
        /// Attempt number being waited for (1-based)
        attempt: u32,
        /// Configured attempt ceiling, for logging
        max_attempts: u32,
    },
    /// Terminal; no retry is scheduled.
    Stopped {
        /// Why the supervisor stopped
        reason: StopReason,
    },
    /// Stale event from a superseded attempt; ignore it.
    Discard,
}

/// Effect of a shutdown request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownOutcome {
    /// Was waiting on the retry timer; the shell cancels it.
    TimerCancelled,
    /// An attempt or connection is in flight; it is torn down as it
    /// terminates and the next failure/loss event stops the machine.
    Deferred,
    /// Stopped directly (was idle).
    Stopped,
    /// Already stopped; nothing to do.
    AlreadyStopped,
}

/// Synchronous state machine for one supervised connection slot.
#[derive(Debug)]
pub(crate) struct SupervisorMachine {
    policy: RetryPolicy,
    state: SupervisorState,
    attempt_count: u32,
    epoch: u64,
    shutting_down: bool,
    stop_reason: Option<StopReason>,
}

impl SupervisorMachine {
    pub(crate) fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: SupervisorState::Idle,
            attempt_count: 0,
            epoch: 0,
            shutting_down: false,
            stop_reason: None,
        }
    }

    pub(crate) fn state(&self) -> SupervisorState {
        self.state
    }

    pub(crate) fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.clone()
    }

    /// Checks that `start()` is legal in the current state without
    /// transitioning, so configuration can be validated first.
    pub(crate) fn ensure_startable(&self) -> Result<(), SupervisorError> {
        match self.state {
            SupervisorState::Idle | SupervisorState::Stopped => Ok(()),
            state => Err(SupervisorError::InvalidState { state }),
        }
    }

    /// Begins a new lifecycle: Idle/Stopped → Connecting.
    ///
    /// Resets the shutdown flag, the attempt counter, and the stop reason;
    /// returns the epoch of the new attempt.
    pub(crate) fn start(&mut self) -> Result<u64, SupervisorError> {
        self.ensure_startable()?;
        self.shutting_down = false;
        self.attempt_count = 0;
        self.stop_reason = None;
        self.epoch += 1;
        self.state = SupervisorState::Connecting;
        Ok(self.epoch)
    }

    /// Returns whether an event with this epoch, expected in `state`,
    /// still belongs to the current attempt.
    pub(crate) fn is_current(&self, epoch: u64, state: SupervisorState) -> bool {
        self.epoch == epoch && self.state == state
    }

    /// The transport reports the attempt with `epoch` went live.
    pub(crate) fn connect_succeeded(&mut self, epoch: u64) -> ConnectOutcome {
        if !self.is_current(epoch, SupervisorState::Connecting) {
            return ConnectOutcome::Discard;
        }
        if self.shutting_down {
            self.state = SupervisorState::Stopped;
            self.stop_reason = Some(StopReason::ShutdownRequested);
            return ConnectOutcome::TearDown;
        }
        self.state = SupervisorState::Connected;
        if self.policy.reset_on_success() {
            self.attempt_count = 0;
        }
        ConnectOutcome::Proceed
    }

    /// The transport reports the attempt with `epoch` never went live.
    pub(crate) fn connection_failed(&mut self, epoch: u64) -> LossOutcome {
        self.disconnected(epoch, DisconnectCause::Failure)
    }

    /// The transport reports the live connection from `epoch` terminated.
    pub(crate) fn connection_lost(&mut self, epoch: u64) -> LossOutcome {
        self.disconnected(epoch, DisconnectCause::Drop)
    }

    fn disconnected(&mut self, epoch: u64, cause: DisconnectCause) -> LossOutcome {
        let expected = match cause {
            DisconnectCause::Failure => SupervisorState::Connecting,
            DisconnectCause::Drop => SupervisorState::Connected,
        };
        if !self.is_current(epoch, expected) {
            return LossOutcome::Discard;
        }
        if self.shutting_down {
            self.state = SupervisorState::Stopped;
            self.stop_reason = Some(StopReason::ShutdownRequested);
            return LossOutcome::Stopped {
                reason: StopReason::ShutdownRequested,
            };
        }
        self.attempt_count += 1;
        match self.policy.should_retry(self.attempt_count, cause) {
            RetryDecision::Retry { delay } => {
                self.state = SupervisorState::ReconnectWait;
                LossOutcome::ScheduleRetry {
                    delay,
                    attempt: self.attempt_count,
                    max_attempts: self.policy.max_attempts(),
                }
            }
            RetryDecision::Disabled { cause } => {
                let reason = StopReason::RetryDisabled { cause };
                self.state = SupervisorState::Stopped;
                self.stop_reason = Some(reason.clone());
                LossOutcome::Stopped { reason }
            }
            RetryDecision::Exhausted => {
                let reason = StopReason::RetriesExhausted {
                    attempts: self.attempt_count,
                };
                self.state = SupervisorState::Stopped;
                self.stop_reason = Some(reason.clone());
                LossOutcome::Stopped { reason }
            }
        }
    }

    /// The retry timer armed for `epoch` fired.
    ///
    /// Returns the epoch of the next attempt, or `None` if the timer was
    /// superseded (cancelled, or the machine moved on).
    pub(crate) fn retry_timer_fired(&mut self, epoch: u64) -> Option<u64> {
        if !self.is_current(epoch, SupervisorState::ReconnectWait) || self.shutting_down {
            return None;
        }
        self.epoch += 1;
        self.state = SupervisorState::Connecting;
        Some(self.epoch)
    }

    /// Protocol resolution failed for an unattended retry attempt.
    ///
    /// There is no `start()` caller to report to, so the machine stops
    /// with the reason recorded.
    pub(crate) fn fail_resolution(&mut self, epoch: u64, reason: String) {
        if !self.is_current(epoch, SupervisorState::Connecting) {
            return;
        }
        self.state = SupervisorState::Stopped;
        self.stop_reason = Some(StopReason::ProtocolResolution { reason });
    }

    /// Requests shutdown. Idempotent; the flag is monotonic until the next
    /// `start()`.
    pub(crate) fn request_shutdown(&mut self) -> ShutdownOutcome {
        self.shutting_down = true;
        match self.state {
            SupervisorState::ReconnectWait => {
                self.state = SupervisorState::Stopped;
                self.stop_reason = Some(StopReason::ShutdownRequested);
                ShutdownOutcome::TimerCancelled
            }
            SupervisorState::Connecting | SupervisorState::Connected => ShutdownOutcome::Deferred,
            SupervisorState::Idle => {
                self.state = SupervisorState::Stopped;
                self.stop_reason = Some(StopReason::ShutdownRequested);
                ShutdownOutcome::Stopped
            }
            SupervisorState::Stopped => ShutdownOutcome::AlreadyStopped,
        }
    }
}
