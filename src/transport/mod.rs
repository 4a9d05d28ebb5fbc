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

//! Transport layer abstractions.
//!
//! This module defines the narrow interface a supervisor consumes to make
//! connection attempts:
//!
//! - [`Connector`]: turns an endpoint's configuration into one physical
//!   connection attempt
//! - [`Link`]: an established connection that reports its own termination
//!   and can be torn down on shutdown
//!
//! Two implementations ship with the crate:
//!
//! - [`TcpConnector`] / [`TcpLink`]: TCP/IP networking
//! - [`MemoryConnector`] / [`MemoryLink`]: scripted in-memory attempts for
//!   deterministic testing
//!
//! Payload I/O is deliberately absent from this layer; supervisors manage
//! connection lifetime, not protocol traffic.

mod error;
mod memory;
mod tcp;
mod traits;

pub use self::error::TransportError;
pub use self::memory::{MemoryConnector, MemoryLink, ScriptedOutcome};
pub use self::tcp::{TcpConnector, TcpLink};
pub use self::traits::{Connector, Link};
