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

//! Retry decision logic.
//!
//! [`RetryPolicy`] is pure configuration: given the attempt number and the
//! cause of a disconnection, it decides whether to retry and after how
//! long. It keeps no state and has no side effects, which makes it
//! trivially testable in isolation; attempt accounting belongs to the
//! supervisor.

mod policy;

pub use self::policy::{DisconnectCause, RetryDecision, RetryPolicy};
