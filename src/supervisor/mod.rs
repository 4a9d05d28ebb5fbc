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

//! Connection lifecycle supervision.
//!
//! A [`ConnectionSupervisor`] owns one logical connection slot: it drives
//! attempts through a [`Connector`](crate::transport::Connector), delivers
//! lifecycle hooks to the endpoint's protocol handle, and applies the
//! configured retry policy when the connection fails or drops. The
//! decision logic lives in a synchronous state machine; the async shell
//! only executes the effects the machine returns.

mod error;
mod machine;
mod state;
#[allow(clippy::module_inception)]
mod supervisor;

pub use self::error::SupervisorError;
pub use self::state::{StopReason, SupervisorState};
pub use self::supervisor::ConnectionSupervisor;
