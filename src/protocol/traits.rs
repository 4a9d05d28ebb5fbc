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

use thiserror::Error;

/// An error raised by a protocol lifecycle hook.
///
/// Hook errors are always logged by the supervisor and never propagated;
/// they cannot block or alter a state transition.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandleError {
    message: String,
}

impl HandleError {
    /// Creates a hook error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for HandleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandleError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// The capability interface a protocol implementation exposes to its
/// supervisor.
///
/// A `ProtocolHandle` is the unit that knows how to speak one wire
/// protocol over an established connection. The supervisor treats it as an
/// opaque capability object: it creates one handle per connection attempt
/// (replacing, never mutating, the previous one) and delivers lifecycle
/// hooks to it. Every hook has a default no-op body, so implementations
/// only override what they care about; absence of a hook is not an error.
///
/// Hook errors are tolerated: the supervisor logs them and carries on.
///
/// # Examples
///
/// ```rust
/// use tether::{HandleError, ProtocolHandle};
///
/// struct IrcHandle;
///
/// #[async_trait::async_trait]
/// impl ProtocolHandle for IrcHandle {
///     fn protocol_type(&self) -> &str {
///         "irc"
///     }
///
///     async fn on_connected(&self) -> Result<(), HandleError> {
///         // register, join channels, ...
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait ProtocolHandle: Send + Sync {
    /// Name of the wire protocol this handle implements.
    ///
    /// Used for logging and correlation only.
    fn protocol_type(&self) -> &str;

    /// Called once the connection is live.
    async fn on_connected(&self) -> Result<(), HandleError> {
        Ok(())
    }

    /// Called when a previously established connection terminated.
    async fn on_connection_lost(&self) -> Result<(), HandleError> {
        Ok(())
    }

    /// Called when a connection attempt never reached the connected state.
    async fn on_connection_failed(&self) -> Result<(), HandleError> {
        Ok(())
    }

    /// Called when the handle is being discarded.
    ///
    /// This runs on explicit shutdown and whenever a new attempt replaces
    /// this handle with a fresh one.
    async fn shutdown(&self) -> Result<(), HandleError> {
        Ok(())
    }
}
