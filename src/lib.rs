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

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Architecture
//!
//! Tether is organized into a handful of small layers:
//!
//! - **[`transport`]**: the attempt interface, where a [`Connector`]
//!   produces a [`Link`] (an established connection that reports its own
//!   termination)
//! - **[`protocol`]**: the capability interface, where a [`ProtocolHandle`]
//!   receives best-effort lifecycle hooks, resolved by name from a
//!   [`ProtocolRegistry`] of factories
//! - **[`retry`]**: the pure [`RetryPolicy`] deciding whether and after how
//!   long a failed or dropped connection is retried
//! - **[`supervisor`]**: the [`ConnectionSupervisor`] owning one logical
//!   connection slot and its state machine
//! - **[`manager`]**: the [`ConnectionManager`] holding one supervisor per
//!   configured endpoint
//!
//! # Concurrency model
//!
//! Each supervisor serializes its own transitions: at most one connection
//! attempt and one retry timer exist at a time, completions from superseded
//! attempts are detected and discarded, and `request_shutdown()` guarantees
//! no further retry is scheduled before it returns. Supervisors for
//! different endpoints are fully independent.
//!
//! # Error handling
//!
//! Only configuration problems surface synchronously, from
//! [`ConnectionSupervisor::start`]. Asynchronous failures (refused
//! attempts, dropped links, protocol hook errors) are absorbed internally:
//! they drive state transitions and are logged via `tracing`, and retry
//! exhaustion is observable as a terminal [`SupervisorState::Stopped`]
//! with a diagnostic [`StopReason`].

pub mod config;
pub mod error;
pub mod manager;
pub mod protocol;
pub mod retry;
pub mod supervisor;
pub mod transport;

pub use config::{EndpointConfig, RetrySettings};
pub use error::Error;
pub use manager::{ConnectionManager, ManagerError};
pub use protocol::{HandleError, ProtocolFactory, ProtocolHandle, ProtocolRegistry, RegistryError};
pub use retry::{DisconnectCause, RetryDecision, RetryPolicy};
pub use supervisor::{ConnectionSupervisor, StopReason, SupervisorError, SupervisorState};
pub use transport::{Connector, Link, MemoryConnector, TcpConnector, TransportError};
