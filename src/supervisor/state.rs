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

use crate::retry::DisconnectCause;
use std::fmt;

/// State of one supervised connection slot.
///
/// ```text
/// Idle            --start()-->              Connecting
/// Connecting      --connected-->            Connected
/// Connecting      --attempt failed-->       ReconnectWait | Stopped
/// Connected       --connection lost-->      ReconnectWait | Stopped
/// ReconnectWait   --timer fires-->          Connecting
/// ReconnectWait   --request_shutdown()-->   Stopped
/// Stopped         --start()-->              Connecting
/// ```
///
/// A shutdown requested while `Connecting` or `Connected` leaves the state
/// unchanged and forces `Stopped` on the next failure or loss event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Created, never started.
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// The connection is live.
    Connected,
    /// Waiting out the retry delay; a one-shot timer is pending.
    ReconnectWait,
    /// Terminal until `start()` is called again.
    Stopped,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::ReconnectWait => write!(f, "reconnect-wait"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Why a supervisor reached [`SupervisorState::Stopped`].
///
/// Retry exhaustion is reported this way rather than thrown: the endpoint
/// stays stopped until an operator starts it again, and the reason is
/// observable through
/// [`ConnectionSupervisor::stop_reason`](crate::ConnectionSupervisor::stop_reason).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// An explicit shutdown was requested.
    ShutdownRequested,
    /// The attempt ceiling was reached.
    RetriesExhausted {
        /// Attempts made since the last successful connection
        attempts: u32,
    },
    /// Retrying this cause is disabled by configuration.
    RetryDisabled {
        /// The cause whose retry flag is off
        cause: DisconnectCause,
    },
    /// The protocol handle could not be resolved for an unattended retry.
    ProtocolResolution {
        /// Description of the resolution failure
        reason: String,
    },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShutdownRequested => write!(f, "shutdown requested"),
            Self::RetriesExhausted { attempts } => {
                write!(f, "unable to connect after {attempts} attempts")
            }
            Self::RetryDisabled { cause } => write!(f, "retry on {cause} is disabled"),
            Self::ProtocolResolution { reason } => {
                write!(f, "protocol resolution failed: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(SupervisorState::Idle.to_string(), "idle");
        assert_eq!(SupervisorState::Connecting.to_string(), "connecting");
        assert_eq!(SupervisorState::Connected.to_string(), "connected");
        assert_eq!(SupervisorState::ReconnectWait.to_string(), "reconnect-wait");
        assert_eq!(SupervisorState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(
            StopReason::RetriesExhausted { attempts: 3 }.to_string(),
            "unable to connect after 3 attempts"
        );
        assert_eq!(
            StopReason::RetryDisabled {
                cause: DisconnectCause::Drop
            }
            .to_string(),
            "retry on connection drop is disabled"
        );
    }
}
