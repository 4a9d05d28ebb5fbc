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

//! Top-level error type.

use crate::manager::ManagerError;
use crate::protocol::RegistryError;
use crate::supervisor::SupervisorError;
use crate::transport::TransportError;
use thiserror::Error;

/// Any error the crate can surface to a caller.
///
/// Each layer has its own error type; this enum exists so embedding
/// applications can hold one error type across manager, supervisor, and
/// transport calls.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the connection manager.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// Error from a connection supervisor.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// Error from protocol resolution.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Error from a transport.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
