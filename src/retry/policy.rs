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

use crate::config::RetrySettings;
use std::fmt;
use std::time::Duration;

/// Why a connection slot became disconnected.
///
/// The two causes are gated by independent configuration flags: a link
/// that was once established and later terminated is a [`Drop`], an
/// attempt that never reached the connected state is a [`Failure`].
///
/// [`Drop`]: DisconnectCause::Drop
/// [`Failure`]: DisconnectCause::Failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectCause {
    /// An established connection terminated.
    Drop,
    /// A connection attempt never succeeded.
    Failure,
}

impl fmt::Display for DisconnectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "connection drop"),
            Self::Failure => write!(f, "connection failure"),
        }
    }
}

/// The outcome of consulting a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay.
    Retry {
        /// How long to wait before the next attempt
        delay: Duration,
    },
    /// Give up: retries for this cause are disabled.
    Disabled {
        /// The cause whose retry flag is off
        cause: DisconnectCause,
    },
    /// Give up: the attempt ceiling has been reached.
    Exhausted,
}

/// Immutable retry configuration for one endpoint.
///
/// Whether and when to retry is a pure function of the attempt number and
/// the disconnection cause; the policy itself never changes after
/// construction. `max_attempts == 0` means "never retry".
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tether::{DisconnectCause, RetryDecision, RetryPolicy};
///
/// let policy = RetryPolicy::new(Duration::from_secs(10), 5, true, true, true);
///
/// assert_eq!(
///     policy.should_retry(1, DisconnectCause::Failure),
///     RetryDecision::Retry { delay: Duration::from_secs(10) },
/// );
/// assert_eq!(
///     policy.should_retry(6, DisconnectCause::Failure),
///     RetryDecision::Exhausted,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: u32,
    retry_on_drop: bool,
    retry_on_failure: bool,
    reset_on_success: bool,
}

impl RetryPolicy {
    /// Creates a policy from its raw knobs.
    pub fn new(
        delay: Duration,
        max_attempts: u32,
        retry_on_drop: bool,
        retry_on_failure: bool,
        reset_on_success: bool,
    ) -> Self {
        Self {
            delay,
            max_attempts,
            retry_on_drop,
            retry_on_failure,
            reset_on_success,
        }
    }

    /// Decides whether attempt number `attempt` should be made.
    ///
    /// `attempt` is 1-based: it is the number of attempts made since the
    /// last successful connection, including the one that just failed.
    pub fn should_retry(&self, attempt: u32, cause: DisconnectCause) -> RetryDecision {
        let enabled = match cause {
            DisconnectCause::Drop => self.retry_on_drop,
            DisconnectCause::Failure => self.retry_on_failure,
        };
        if !enabled {
            return RetryDecision::Disabled { cause };
        }
        if attempt > self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry { delay: self.delay }
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Attempt ceiling; 0 means never retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the attempt counter resets on a successful connection.
    pub fn reset_on_success(&self) -> bool {
        self.reset_on_success
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            delay: Duration::from_secs(settings.delay),
            max_attempts: settings.attempts,
            retry_on_drop: settings.on_drop,
            retry_on_failure: settings.on_failure,
            reset_on_success: settings.reset_on_success,
        }
    }
}
