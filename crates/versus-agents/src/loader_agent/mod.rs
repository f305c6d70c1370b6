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

//! Background preparation of match assets.
//!
//! A [`Loader`] runs at most one load pass at a time. The pass polls the
//! shared selection, because the select screen may still be editing it,
//! and loads each slot and the stage as soon as their picks are known.

mod agent;
mod cache;
mod pass;
mod slot;
mod state;

pub use agent::Loader;
pub use pass::{MatchAssets, PassProgress};
pub use slot::LoadPlan;
pub use state::LoaderState;
