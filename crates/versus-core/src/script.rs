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

//! The embedded script host and the match commands scripts can issue.

use crate::error::ScriptError;
use crate::team::SlotIndex;

/// A key combination bound to a script snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortcutKey {
    /// Platform key code.
    pub code: u32,
    /// Control modifier.
    pub ctrl: bool,
    /// Alt modifier.
    pub alt: bool,
    /// Shift modifier.
    pub shift: bool,
}

impl ShortcutKey {
    /// A key without modifiers.
    pub const fn plain(code: u32) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    /// The same key with the control modifier.
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// An instruction a script hands back to the running match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchCommand {
    /// Rewind the current round to its start.
    ResetRound,
    /// Abandon the match and reload every asset.
    Reload,
    /// Change the simulation speed multiplier.
    SetTurbo(f32),
    /// Show or hide the debug overlay.
    ToggleDebugDraw,
    /// Freeze or resume the simulation.
    TogglePause,
    /// Advance a single logical tick while paused.
    Step,
}

/// Runs script snippets on behalf of the match.
pub trait ScriptHost {
    /// Executes `source` and returns the commands it issued.
    fn execute(&mut self, source: &str) -> Result<Vec<MatchCommand>, ScriptError>;

    /// Produces the debug status line of a slot, if the script defines one.
    fn status(&mut self, _slot: SlotIndex) -> Result<Option<String>, ScriptError> {
        Ok(None)
    }
}

/// A host that runs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScriptHost;

impl ScriptHost for NullScriptHost {
    fn execute(&mut self, _source: &str) -> Result<Vec<MatchCommand>, ScriptError> {
        Ok(Vec::new())
    }
}
