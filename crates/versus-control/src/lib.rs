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

//! # Versus Control
//!
//! The rules of a match: how rounds start, progress and end, how global
//! freezes nest inside a round, and how life pools are scaled between
//! mismatched teams.

#![warn(missing_docs)]

pub mod freeze;
pub mod handicap;
pub mod life;
pub mod round;

pub use freeze::{FreezeState, FreezeWindow, FreezeWindows};
pub use handicap::HandicapTable;
pub use life::{LifeScaler, RoundTransition};
pub use round::{FinishKind, RoundController, RoundEvent, RoundPhase};
