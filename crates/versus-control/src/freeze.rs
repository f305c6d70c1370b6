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

//! Pause and super-pause windows.
//!
//! A window is either idle, armed (it starts on the next tick) or active
//! with a remaining duration. A super pause takes precedence: while it runs
//! an active regular pause does not count down.

use versus_core::team::SlotIndex;
use versus_core::world::{FreezeKind, FreezeRequest, FreezeView};

/// State of one freeze window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreezeState {
    /// Not running.
    #[default]
    Idle,
    /// Starts on the next tick for the given number of ticks.
    Armed(u32),
    /// Running with the given number of ticks left.
    Active(u32),
}

impl FreezeState {
    /// Interprets a raw signed counter: negative values are armed for their
    /// magnitude, positive values are already running.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => FreezeState::Idle,
            n if n < 0 => FreezeState::Armed(n.unsigned_abs()),
            n => FreezeState::Active(n as u32),
        }
    }
}

/// One freeze window and the entity that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreezeWindow {
    state: FreezeState,
    owner: Option<SlotIndex>,
    pause_background: bool,
    end_command_buffer_time: i32,
}

impl FreezeWindow {
    /// Current state.
    pub fn state(&self) -> FreezeState {
        self.state
    }

    /// Sets the window from a raw signed counter.
    pub fn set_raw(&mut self, raw: i32) {
        self.state = FreezeState::from_raw(raw);
    }

    /// `true` while the window counts down.
    pub fn is_active(&self) -> bool {
        matches!(self.state, FreezeState::Active(n) if n > 0)
    }

    /// Ticks left while active, zero otherwise.
    pub fn remaining(&self) -> u32 {
        match self.state {
            FreezeState::Active(n) => n,
            _ => 0,
        }
    }

    /// Entity exempt from the freeze.
    pub fn owner(&self) -> Option<SlotIndex> {
        self.owner
    }

    /// Whether the stage background freezes too.
    pub fn pauses_background(&self) -> bool {
        self.pause_background
    }

    /// Frozen entities buffer commands during the last ticks of the window.
    pub fn buffers_commands(&self) -> bool {
        self.remaining() as i32 <= self.end_command_buffer_time
    }

    fn start(&mut self, request: &FreezeRequest) {
        self.set_raw(request.duration);
        self.owner = Some(request.owner);
        self.pause_background = request.pause_background;
        self.end_command_buffer_time = request.end_command_buffer_time;
    }

    fn count_down(&mut self) {
        if let FreezeState::Active(n) = self.state {
            self.state = match n.saturating_sub(1) {
                0 => FreezeState::Idle,
                left => FreezeState::Active(left),
            };
        }
    }

    fn trigger(&mut self) {
        if let FreezeState::Armed(n) = self.state {
            self.state = FreezeState::Active(n);
        }
    }
}

/// The regular pause and the super pause of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreezeWindows {
    /// Regular pause.
    pub pause: FreezeWindow,
    /// Super pause.
    pub super_pause: FreezeWindow,
}

impl FreezeWindows {
    /// Advances both windows by one logical tick.
    ///
    /// The running window with the highest precedence counts down first,
    /// then armed windows become active.
    pub fn step(&mut self) {
        if self.super_pause.is_active() {
            self.super_pause.count_down();
        } else if self.pause.is_active() {
            self.pause.count_down();
        }
        self.super_pause.trigger();
        self.pause.trigger();
    }

    /// Starts the window a world event asked for.
    pub fn request(&mut self, request: &FreezeRequest) {
        log::trace!(
            "{:?} requested by {} for {} ticks.",
            request.kind,
            request.owner,
            request.duration
        );
        match request.kind {
            FreezeKind::Pause => self.pause.start(request),
            FreezeKind::Super => self.super_pause.start(request),
        }
    }

    /// `true` while either window counts down.
    pub fn any_active(&self) -> bool {
        self.pause.is_active() || self.super_pause.is_active()
    }

    /// `false` when an active window also freezes the stage background.
    pub fn stage_runs(&self) -> bool {
        !(self.super_pause.is_active() && self.super_pause.pauses_background())
            && !(self.pause.is_active() && self.pause.pauses_background())
    }

    /// Freeze state as handed to the world.
    pub fn view(&self) -> FreezeView {
        let governing = if self.super_pause.is_active() {
            Some(&self.super_pause)
        } else if self.pause.is_active() {
            Some(&self.pause)
        } else {
            None
        };
        FreezeView {
            pause: self.pause.is_active(),
            super_pause: self.super_pause.is_active(),
            owner: governing.and_then(FreezeWindow::owner),
            buffer_commands: governing.map_or(true, FreezeWindow::buffers_commands),
        }
    }

    /// Stops both windows.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: FreezeKind, duration: i32) -> FreezeRequest {
        FreezeRequest {
            kind,
            duration,
            owner: SlotIndex::leader(versus_core::Side::One),
            pause_background: true,
            end_command_buffer_time: 2,
        }
    }

    #[test]
    fn test_armed_window_activates_then_counts_down() {
        // --- 1. ARRANGE ---
        let mut windows = FreezeWindows::default();
        windows.pause.set_raw(-5);
        assert_eq!(windows.pause.state(), FreezeState::Armed(5));
        assert!(!windows.any_active());

        // --- 2. ACT & ASSERT ---
        windows.step();
        assert_eq!(windows.pause.state(), FreezeState::Active(5));
        for expected in (0..5).rev() {
            windows.step();
            assert_eq!(windows.pause.remaining(), expected);
        }
        assert_eq!(windows.pause.state(), FreezeState::Idle);
    }

    #[test]
    fn test_super_pause_takes_precedence() {
        let mut windows = FreezeWindows::default();
        windows.pause.set_raw(10);
        windows.super_pause.set_raw(3);

        windows.step();
        assert_eq!(windows.super_pause.remaining(), 2);
        assert_eq!(windows.pause.remaining(), 10);

        windows.step();
        windows.step();
        assert!(!windows.super_pause.is_active());
        windows.step();
        assert_eq!(windows.pause.remaining(), 9);
    }

    #[test]
    fn test_background_freeze_stops_stage() {
        let mut windows = FreezeWindows::default();
        assert!(windows.stage_runs());
        windows.request(&request(FreezeKind::Super, 4));
        assert!(!windows.stage_runs());
        assert_eq!(windows.view().owner, Some(SlotIndex::leader(versus_core::Side::One)));
    }

    #[test]
    fn test_command_buffering_near_the_end() {
        let mut windows = FreezeWindows::default();
        windows.request(&request(FreezeKind::Pause, 4));
        assert!(!windows.view().buffer_commands);
        windows.step();
        windows.step();
        assert!(windows.view().buffer_commands);
    }
}
