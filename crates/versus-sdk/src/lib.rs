// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Versus SDK
//!
//! The match loop and the session driver that ties the loader, the round
//! rules and the frame clock together.

#![warn(missing_docs)]

pub mod camera;
pub mod fight;
pub mod hotkeys;
pub mod session;
pub mod snapshot;

pub use camera::CameraTracker;
pub use fight::{Collaborators, FightOutcome, MatchLoop};
pub use hotkeys::CommandDispatcher;
pub use session::{Session, SessionOutcome};
pub use snapshot::RoundSnapshot;
