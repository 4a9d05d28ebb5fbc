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
use crate::protocol::ProtocolHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors from resolving a protocol type against the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No factory is registered under the requested protocol type.
    #[error("unknown protocol type '{protocol}'")]
    UnknownProtocol {
        /// The protocol type that was requested
        protocol: String,
    },

    /// The factory refused to build a handle for this endpoint.
    #[error("protocol '{protocol}' factory failed: {reason}")]
    Factory {
        /// The protocol type whose factory failed
        protocol: String,
        /// Description of the failure
        reason: String,
    },
}

/// A named factory producing protocol handles.
///
/// Factories are registered under a protocol type name and invoked once
/// per connection attempt, so every attempt gets a fresh handle.
pub trait ProtocolFactory: Send + Sync {
    /// Builds a handle for the given endpoint.
    fn create(&self, endpoint: &EndpointConfig) -> Result<Arc<dyn ProtocolHandle>, RegistryError>;
}

impl<F> ProtocolFactory for F
where
    F: Fn(&EndpointConfig) -> Result<Arc<dyn ProtocolHandle>, RegistryError> + Send + Sync,
{
    fn create(&self, endpoint: &EndpointConfig) -> Result<Arc<dyn ProtocolHandle>, RegistryError> {
        self(endpoint)
    }
}

/// Registry of protocol-handle factories, keyed by protocol type.
///
/// The handle type implementing the wire protocol is selected by
/// configuration at start time rather than fixed at supervisor
/// construction, so operators can change protocol implementations without
/// recreating the supervisor. Resolution failure is a configuration error
/// surfaced to the caller of `start()`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tether::{EndpointConfig, ProtocolHandle, ProtocolRegistry};
///
/// struct EchoHandle;
///
/// #[async_trait::async_trait]
/// impl ProtocolHandle for EchoHandle {
///     fn protocol_type(&self) -> &str {
///         "echo"
///     }
/// }
///
/// let registry = ProtocolRegistry::new();
/// registry.register("echo", |_endpoint: &EndpointConfig| {
///     Ok(Arc::new(EchoHandle) as Arc<dyn ProtocolHandle>)
/// });
///
/// let config = EndpointConfig::new("local", "echo", "127.0.0.1:7777");
/// let handle = registry.resolve(&config).unwrap();
/// assert_eq!(handle.protocol_type(), "echo");
/// ```
#[derive(Default)]
pub struct ProtocolRegistry {
    factories: RwLock<HashMap<String, Arc<dyn ProtocolFactory>>>,
}

impl ProtocolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory closure under a protocol type name.
    ///
    /// Replaces any factory previously registered under the same name,
    /// which is what a configuration reload wants.
    pub fn register<F>(&self, protocol_type: impl Into<String>, factory: F)
    where
        F: Fn(&EndpointConfig) -> Result<Arc<dyn ProtocolHandle>, RegistryError>
            + Send
            + Sync
            + 'static,
    {
        self.register_factory(protocol_type, Arc::new(factory));
    }

    /// Registers a factory object under a protocol type name.
    pub fn register_factory(
        &self,
        protocol_type: impl Into<String>,
        factory: Arc<dyn ProtocolFactory>,
    ) {
        self.factories.write().insert(protocol_type.into(), factory);
    }

    /// Removes the factory registered under a protocol type name.
    pub fn unregister(&self, protocol_type: &str) -> bool {
        self.factories.write().remove(protocol_type).is_some()
    }

    /// Returns whether a factory is registered under this name.
    pub fn contains(&self, protocol_type: &str) -> bool {
        self.factories.read().contains_key(protocol_type)
    }

    /// Registered protocol type names.
    pub fn protocol_types(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }

    /// Resolves the endpoint's protocol type and builds a fresh handle.
    pub fn resolve(
        &self,
        endpoint: &EndpointConfig,
    ) -> Result<Arc<dyn ProtocolHandle>, RegistryError> {
        let factory = self
            .factories
            .read()
            .get(&endpoint.protocol_type)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProtocol {
                protocol: endpoint.protocol_type.clone(),
            })?;
        factory.create(endpoint)
    }
}
