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

//! Protocol capability interface and dynamic resolution.
//!
//! A [`ProtocolHandle`] is the externally supplied unit that speaks one
//! wire protocol over an established connection; the supervisor treats it
//! as an opaque capability object and delivers best-effort lifecycle hooks
//! to it. Implementations are selected by name at start time through a
//! [`ProtocolRegistry`] of factories, so operators can swap protocol
//! implementations without recreating supervisors.

mod registry;
mod traits;

pub use self::registry::{ProtocolFactory, ProtocolRegistry, RegistryError};
pub use self::traits::{HandleError, ProtocolHandle};
