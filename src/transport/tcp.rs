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

//! TCP connector implementation.
//!
//! Wraps Tokio's `TcpStream` behind the [`Connector`]/[`Link`] seam so a
//! supervisor can drive plain TCP endpoints.

use crate::config::EndpointConfig;
use crate::transport::{Connector, Link, TransportError};
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::debug;

/// TCP implementation of the connection attempt interface.
///
/// One attempt maps to one `TcpStream::connect`, bounded by the endpoint's
/// `connect-timeout` if configured. The connector performs no retries of
/// its own; that is the supervisor's job.
///
/// # Examples
///
/// ```rust,no_run
/// use tether::{Connector, EndpointConfig, TcpConnector};
///
/// # async fn example() -> Result<(), tether::TransportError> {
/// let connector = TcpConnector::default();
/// let config = EndpointConfig::new("local", "echo", "127.0.0.1:7777");
/// let link = connector.attempt(&config).await?;
/// println!("connected to {:?}", link.peer_addr());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl TcpConnector {
    /// Creates a new TCP connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn attempt(&self, endpoint: &EndpointConfig) -> Result<Box<dyn Link>, TransportError> {
        let address = endpoint.address.clone();
        debug!(endpoint = %endpoint.name, %address, "attempting TCP connection");

        let connect = TcpStream::connect(&address);
        let stream = match endpoint.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| TransportError::Timeout { duration: limit })?,
            None => connect.await,
        }
        .map_err(|source| TransportError::ConnectionFailed {
            address: address.clone(),
            source,
        })?;

        Ok(Box::new(TcpLink { stream }))
    }
}

/// A live TCP connection held by a supervisor.
///
/// Termination is detected by reading the stream: EOF or an I/O error
/// resolves [`Link::closed`]. Payload bytes are discarded here; protocol
/// I/O happens above this layer.
pub struct TcpLink {
    stream: TcpStream,
}

#[async_trait::async_trait]
impl Link for TcpLink {
    async fn closed(&mut self) -> TransportError {
        let mut scratch = [0u8; 4096];
        loop {
            match self.stream.read(&mut scratch).await {
                Ok(0) => {
                    return TransportError::ConnectionLost {
                        reason: "peer closed the connection".to_string(),
                        source: None,
                    };
                }
                Ok(_) => continue,
                Err(source) => {
                    return TransportError::ConnectionLost {
                        reason: "read failed".to_string(),
                        source: Some(source),
                    };
                }
            }
        }
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.stream)
            .await
            .map_err(|source| TransportError::Io { source })
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }
}
