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

use crate::protocol::RegistryError;
use crate::supervisor::SupervisorState;
use thiserror::Error;

/// Errors surfaced by supervisor operations.
///
/// Transport failures are not represented here: they feed the retry
/// machinery instead of being returned to callers.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The operation is not legal in the current state.
    #[error("operation not permitted while {state}")]
    InvalidState {
        /// State the supervisor was in
        state: SupervisorState,
    },

    /// The endpoint configuration is unusable.
    #[error("invalid endpoint configuration: {reason}")]
    Configuration {
        /// Description of the configuration problem
        reason: String,
    },

    /// The endpoint's protocol type could not be resolved to a handle.
    #[error(transparent)]
    Protocol(#[from] RegistryError),
}
