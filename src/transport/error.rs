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

//! Transport layer error types.
//!
//! Transport errors are the lowest level in the error hierarchy and
//! represent failures in the underlying network communication. They are
//! never raised out of a supervisor's asynchronous callbacks; instead they
//! drive the retry policy and are recorded as the diagnostic reason when a
//! supervisor stops.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the transport layer.
///
/// These are recoverable in the sense of the retry policy: a failed or
/// dropped connection may be retried, subject to the configured limits.
///
/// # Examples
///
/// ```rust
/// use tether::TransportError;
/// use std::io;
///
/// let error = TransportError::ConnectionFailed {
///     address: "127.0.0.1:6667".to_string(),
///     source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
/// };
///
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection to the remote endpoint.
    ///
    /// This error occurs during connection establishment, before the link
    /// ever became live. It drives the retry policy's `on-failure` path.
    #[error("failed to connect to {address}: {source}")]
    ConnectionFailed {
        /// The address that failed to connect
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An established connection terminated.
    ///
    /// This error occurs when a previously live link is closed by the peer
    /// or becomes unusable. It drives the retry policy's `on-drop` path.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Description of why the connection was lost
        reason: String,
        /// The underlying I/O error, if available
        #[source]
        source: Option<io::Error>,
    },

    /// A connection attempt exceeded its configured time limit.
    #[error("connect timed out after {duration:?}")]
    Timeout {
        /// The duration that was exceeded
        duration: Duration,
    },

    /// The link was closed deliberately by this side.
    ///
    /// Reported when a shutdown request tears down a live link; the
    /// supervisor treats it as a non-retryable termination.
    #[error("link closed locally")]
    Closed,

    /// An unexpected I/O error occurred.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Returns `true` if this error is potentially recoverable via retry.
    ///
    /// [`TransportError::Closed`] is the one non-recoverable case: the
    /// link was torn down on purpose.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed { .. }
            | TransportError::ConnectionLost { .. }
            | TransportError::Timeout { .. } => true,
            TransportError::Closed => false,
            TransportError::Io { source } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
        }
    }

    /// Create a connection failed error for testing.
    #[cfg(test)]
    pub(crate) fn connection_failed(address: impl Into<String>) -> Self {
        TransportError::ConnectionFailed {
            address: address.into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        }
    }

    /// Create a connection lost error for testing.
    #[cfg(test)]
    pub(crate) fn connection_lost(reason: impl Into<String>) -> Self {
        TransportError::ConnectionLost {
            reason: reason.into(),
            source: None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io { source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_is_recoverable() {
        let error = TransportError::connection_failed("127.0.0.1:6667");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_connection_lost_is_recoverable() {
        let error = TransportError::connection_lost("peer closed");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_closed_not_recoverable() {
        assert!(!TransportError::Closed.is_recoverable());
    }

    #[test]
    fn test_timeout_is_recoverable() {
        let error = TransportError::Timeout {
            duration: Duration::from_secs(30),
        };
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_permanent_io_error_not_recoverable() {
        let error = TransportError::Io {
            source: io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_display() {
        let error = TransportError::connection_lost("peer closed");
        assert_eq!(error.to_string(), "connection lost: peer closed");
    }
}
