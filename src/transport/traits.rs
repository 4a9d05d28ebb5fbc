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
use crate::transport::TransportError;
use std::net::SocketAddr;

/// The connection attempt interface consumed by a supervisor.
///
/// A `Connector` knows how to turn an endpoint's configuration into one
/// physical connection attempt. The supervisor reports success or failure
/// of the attempt asynchronously to the rest of the system; the connector
/// itself only has to produce a [`Link`] or an error.
///
/// Implementations must be shareable: one connector instance typically
/// serves every supervisor in a [`ConnectionManager`](crate::ConnectionManager).
///
/// # Examples
///
/// ```rust
/// use tether::{Connector, EndpointConfig};
///
/// # async fn example(connector: &dyn Connector, config: &EndpointConfig) {
/// match connector.attempt(config).await {
///     Ok(link) => println!("connected to {:?}", link.peer_addr()),
///     Err(error) => eprintln!("attempt failed: {}", error),
/// }
/// # }
/// ```
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Attempts to establish a single connection to the endpoint.
    ///
    /// Returns a live [`Link`] on success. Failures are recoverable as far
    /// as the retry policy allows; the connector should not retry
    /// internally.
    async fn attempt(&self, endpoint: &EndpointConfig) -> Result<Box<dyn Link>, TransportError>;
}

/// An established connection owned by a supervisor.
///
/// A `Link` is the transport-level half of a live connection slot. The
/// supervisor holds it for the lifetime of the connection and uses it for
/// exactly two things: waiting for the link to terminate, and tearing it
/// down on shutdown. Payload I/O belongs to the protocol layer and is not
/// part of this interface.
#[async_trait::async_trait]
pub trait Link: Send {
    /// Resolves when the link terminates, describing why.
    ///
    /// This is the transport-level termination signal: peer close, I/O
    /// error, or a local [`Link::shutdown`]. It resolves exactly once;
    /// behavior of further calls is unspecified.
    async fn closed(&mut self) -> TransportError;

    /// Deliberately closes the link.
    ///
    /// After this call, [`Link::closed`] resolves promptly. Errors during
    /// teardown are reported but the link must be considered unusable
    /// either way.
    async fn shutdown(&mut self) -> Result<(), TransportError>;

    /// Returns the peer address, if the transport has one.
    ///
    /// Used for logging only.
    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
