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

//! Management of many supervised endpoints.
//!
//! The [`ConnectionManager`] holds one [`ConnectionSupervisor`] per named
//! endpoint, sharing a protocol registry and a connector across all of
//! them. Supervisors are fully independent; the manager only adds the
//! by-name bookkeeping and the start-all/shutdown-all sweeps an embedding
//! application wants at boot and exit.

use crate::config::EndpointConfig;
use crate::protocol::ProtocolRegistry;
use crate::supervisor::{ConnectionSupervisor, SupervisorError, SupervisorState};
use crate::transport::Connector;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An endpoint with this name is already managed.
    #[error("endpoint '{name}' already exists")]
    EndpointExists {
        /// The conflicting endpoint name
        name: String,
    },

    /// No endpoint with this name is managed.
    #[error("endpoint '{name}' not found")]
    EndpointNotFound {
        /// The requested endpoint name
        name: String,
    },

    /// The endpoint cannot be removed while its lifecycle is active.
    #[error("endpoint '{name}' is {state}, shut it down first")]
    NotStopped {
        /// The endpoint name
        name: String,
        /// Its current state
        state: SupervisorState,
    },

    /// The endpoint's supervisor rejected the operation.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Holds one supervisor per configured endpoint.
pub struct ConnectionManager {
    registry: Arc<ProtocolRegistry>,
    connector: Arc<dyn Connector>,
    supervisors: RwLock<HashMap<String, ConnectionSupervisor>>,
}

impl ConnectionManager {
    /// Creates a manager whose endpoints share `registry` and `connector`.
    pub fn new(registry: Arc<ProtocolRegistry>, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
            supervisors: RwLock::new(HashMap::new()),
        }
    }

    /// The protocol registry shared by all managed endpoints.
    pub fn registry(&self) -> &Arc<ProtocolRegistry> {
        &self.registry
    }

    /// Adds an endpoint without starting it.
    ///
    /// Endpoint names are unique; adding a duplicate is an error rather
    /// than a replacement so a running supervisor cannot be silently
    /// orphaned.
    pub fn add_endpoint(&self, config: EndpointConfig) -> Result<(), ManagerError> {
        let mut supervisors = self.supervisors.write();
        if supervisors.contains_key(&config.name) {
            return Err(ManagerError::EndpointExists {
                name: config.name.clone(),
            });
        }
        let name = config.name.clone();
        let supervisor = ConnectionSupervisor::new(
            config,
            Arc::clone(&self.registry),
            Arc::clone(&self.connector),
        );
        supervisors.insert(name, supervisor);
        Ok(())
    }

    /// Removes an endpoint.
    ///
    /// Only legal while the endpoint is idle or stopped.
    pub fn remove_endpoint(&self, name: &str) -> Result<(), ManagerError> {
        let mut supervisors = self.supervisors.write();
        let supervisor = supervisors
            .get(name)
            .ok_or_else(|| ManagerError::EndpointNotFound {
                name: name.to_string(),
            })?;
        match supervisor.state() {
            SupervisorState::Idle | SupervisorState::Stopped => {
                supervisors.remove(name);
                Ok(())
            }
            state => Err(ManagerError::NotStopped {
                name: name.to_string(),
                state,
            }),
        }
    }

    /// The supervisor for an endpoint, if one is managed under that name.
    pub fn supervisor(&self, name: &str) -> Option<ConnectionSupervisor> {
        self.supervisors.read().get(name).cloned()
    }

    /// Current state of an endpoint.
    pub fn state(&self, name: &str) -> Option<SupervisorState> {
        self.supervisors.read().get(name).map(|s| s.state())
    }

    /// Names of all managed endpoints.
    pub fn endpoint_names(&self) -> Vec<String> {
        self.supervisors.read().keys().cloned().collect()
    }

    /// Number of managed endpoints.
    pub fn len(&self) -> usize {
        self.supervisors.read().len()
    }

    /// Whether no endpoints are managed.
    pub fn is_empty(&self) -> bool {
        self.supervisors.read().is_empty()
    }

    /// Starts one endpoint by name.
    pub async fn start(&self, name: &str) -> Result<(), ManagerError> {
        let supervisor = self
            .supervisor(name)
            .ok_or_else(|| ManagerError::EndpointNotFound {
                name: name.to_string(),
            })?;
        supervisor.start().await?;
        Ok(())
    }

    /// Requests shutdown of one endpoint by name.
    pub async fn shutdown(&self, name: &str) -> Result<(), ManagerError> {
        let supervisor = self
            .supervisor(name)
            .ok_or_else(|| ManagerError::EndpointNotFound {
                name: name.to_string(),
            })?;
        supervisor.request_shutdown().await;
        Ok(())
    }

    /// Starts every endpoint that is currently startable.
    ///
    /// Endpoints that fail to start are logged and skipped; the failures
    /// are returned so callers can report them.
    pub async fn start_all(&self) -> Vec<(String, SupervisorError)> {
        let supervisors: Vec<ConnectionSupervisor> =
            self.supervisors.read().values().cloned().collect();
        let mut failures = Vec::new();
        for supervisor in supervisors {
            if let Err(cause) = supervisor.start().await {
                warn!(endpoint = %supervisor.name(), %cause, "endpoint failed to start");
                failures.push((supervisor.name().to_string(), cause));
            }
        }
        failures
    }

    /// Requests shutdown of every endpoint.
    pub async fn shutdown_all(&self) {
        let supervisors: Vec<ConnectionSupervisor> =
            self.supervisors.read().values().cloned().collect();
        info!(endpoints = supervisors.len(), "shutting down all endpoints");
        for supervisor in supervisors {
            supervisor.request_shutdown().await;
        }
    }
}
