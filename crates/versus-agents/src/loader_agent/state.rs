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

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a load pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoaderState {
    /// No pass started since the last reset.
    NotYet = 0,
    /// A pass is running.
    Loading = 1,
    /// Every required asset is ready.
    Complete = 2,
    /// A required asset failed to load.
    Error = 3,
    /// The pass was cancelled; not a failure.
    Cancelled = 4,
}

impl LoaderState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => LoaderState::Loading,
            2 => LoaderState::Complete,
            3 => LoaderState::Error,
            4 => LoaderState::Cancelled,
            _ => LoaderState::NotYet,
        }
    }

    /// `true` for the states a pass ends in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoaderState::Complete | LoaderState::Error | LoaderState::Cancelled
        )
    }
}

/// State cell shared between the loader and its pass.
///
/// Doubles as the cancellation token: the foreground cancels by moving a
/// running pass to `Cancelled`, and the pass only leaves `Loading` through
/// a compare-and-swap, so exactly one terminal state wins.
#[derive(Debug, Clone)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(LoaderState::NotYet as u8)))
    }

    pub(crate) fn get(&self) -> LoaderState {
        LoaderState::from_raw(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: LoaderState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Moves from `from` to `to`; returns `false` if the state was not `from`.
    pub(crate) fn transition(&self, from: LoaderState, to: LoaderState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
