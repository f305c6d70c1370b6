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

//! # Versus Core
//!
//! Foundational crate containing the match data model, the collaborator
//! contracts the fight loop talks to, and the frame clock that paces it.

#![warn(missing_docs)]

pub mod asset;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod platform;
pub mod script;
pub mod selection;
pub mod team;
pub mod utils;
pub mod world;

pub use clock::{FramePacer, TickAccumulator};
pub use config::RuntimeConfig;
pub use entity::{Combatant, EntityDefinition, EntityLifeSnapshot, Roster};
pub use error::{ConfigError, LoadError, ScriptError, SyncError};
pub use selection::{Catalog, MatchContext, RosterEntry, Selection, StageChoice};
pub use team::{Side, SlotIndex, TeamConfiguration, TeamMode, MAX_SIMUL, MAX_SLOTS};
pub use utils::timer::Stopwatch;
