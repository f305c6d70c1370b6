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

//! Contracts for the window, renderer, input and time services the fight
//! loop runs on.

use crate::error::SyncError;
use crate::script::ShortcutKey;
use std::thread;
use std::time::{Duration, Instant};

/// The surface frames are presented to.
pub trait RenderTarget {
    /// Presents the frame drawn since the last call.
    fn present(&mut self);
    /// Clears the back buffer and resets the viewport for the next frame.
    fn clear_and_set_viewport(&mut self);
    /// Draws the debug overlay. Backends without text rendering ignore it.
    fn draw_debug_text(&mut self, _lines: &[String]) {}
}

/// The window event queue.
pub trait EventPump {
    /// Processes pending window events.
    fn poll_events(&mut self);
    /// `true` once the user asked to close the window.
    fn should_close(&self) -> bool;
    /// Shortcut keys pressed since the last call.
    fn take_shortcuts(&mut self) -> Vec<ShortcutKey> {
        Vec::new()
    }
}

/// Player input, local or synchronized with remote peers.
pub trait InputSource {
    /// Waits until every peer is ready to start a fight.
    fn synchronize(&mut self) -> Result<(), SyncError> {
        Ok(())
    }
    /// Advances the input stream by one presented frame.
    fn update(&mut self) -> Result<(), SyncError> {
        Ok(())
    }
    /// `true` while any button of any player is held.
    fn any_button(&self) -> bool;
    /// `true` while any attack button is held; used to fast-forward replays.
    fn any_hard_button(&self) -> bool {
        false
    }
    /// `true` when input is played back from a recording.
    fn is_replay(&self) -> bool {
        false
    }
}

/// A monotonic clock the frame pacer sleeps against.
pub trait TimeSource {
    /// Current instant.
    fn now(&self) -> Instant;
    /// Blocks for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The operating system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
