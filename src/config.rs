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

//! Endpoint and retry configuration.
//!
//! Configuration is read once at `start()` time and treated as immutable
//! by the supervisor. The types derive serde with kebab-case keys
//! (`protocol-type`, `reset-on-success`, ...) so they deserialize from
//! whatever format the embedding application uses; file IO stays with the
//! embedder.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconnection settings for one endpoint.
///
/// `attempts == 0` means a failed or dropped connection is never retried.
///
/// # Examples
///
/// ```rust
/// use tether::RetrySettings;
///
/// let settings: RetrySettings = serde_json::from_str(
///     r#"{ "delay": 10, "attempts": 5, "on-drop": true, "on-failure": true, "reset-on-success": true }"#,
/// ).unwrap();
/// assert_eq!(settings.delay, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetrySettings {
    /// Seconds to wait between attempts.
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Maximum number of attempts since the last successful connection.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Retry after an established connection drops.
    #[serde(default = "default_enabled")]
    pub on_drop: bool,

    /// Retry after a connection attempt that never succeeded.
    #[serde(default = "default_enabled")]
    pub on_failure: bool,

    /// Reset the attempt counter on a successful connection.
    #[serde(default = "default_enabled")]
    pub reset_on_success: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            attempts: default_attempts(),
            on_drop: default_enabled(),
            on_failure: default_enabled(),
            reset_on_success: default_enabled(),
        }
    }
}

fn default_delay() -> u64 {
    10
}

fn default_attempts() -> u32 {
    5
}

fn default_enabled() -> bool {
    true
}

/// Configuration for one supervised endpoint.
///
/// The `name` identifies the supervisor in logs and manager lookups and is
/// stable for its lifetime. The `protocol-type` names the protocol
/// implementation to resolve from the [`ProtocolRegistry`] at start time.
///
/// [`ProtocolRegistry`]: crate::ProtocolRegistry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Stable identifier for logging and manager lookups.
    pub name: String,

    /// Name of the protocol implementation to resolve at start time.
    pub protocol_type: String,

    /// Remote address, in whatever form the connector expects.
    #[serde(default)]
    pub address: String,

    /// Seconds to allow a single connection attempt, unlimited if absent.
    #[serde(default)]
    pub connect_timeout: Option<u64>,

    /// Reconnection settings for this endpoint.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl EndpointConfig {
    /// Creates a configuration with default retry settings.
    pub fn new(
        name: impl Into<String>,
        protocol_type: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            protocol_type: protocol_type.into(),
            address: address.into(),
            connect_timeout: None,
            retry: RetrySettings::default(),
        }
    }

    /// Replaces the retry settings.
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Bounds each connection attempt to `seconds`.
    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = Some(seconds);
        self
    }

    /// Connection attempt time limit as a [`Duration`], if configured.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_secs)
    }
}
