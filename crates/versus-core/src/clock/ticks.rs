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

/// Accumulates fractional logical ticks from a per-frame speed multiplier.
///
/// Each call to [`add_logical_tick`](Self::add_logical_tick) advances the
/// tick count by at most one. When the multiplier is above 1 the
/// accumulator runs ahead of the tick count, and the following calls are
/// catch-up calls: they tick and return `false` so the caller simulates
/// without presenting a frame. Over many calls the number of ticks per
/// presented frame converges to the multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct TickAccumulator {
    tick_count: i64,
    previous_tick_count: i64,
    accumulated: f64,
    last_tick_at: f64,
    pending: f64,
}

impl Default for TickAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl TickAccumulator {
    /// Creates an accumulator in its reset state.
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            // The iteration right after a reset always simulates.
            previous_tick_count: -1,
            accumulated: 0.0,
            last_tick_at: 0.0,
            pending: 0.0,
        }
    }

    /// Returns the accumulator to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Adds `multiplier` ticks' worth of time, applied on the next call.
    ///
    /// Returns `false` for a catch-up call, which may tick but must not be
    /// presented or paced. Negative multipliers are treated as zero.
    pub fn add_logical_tick(&mut self, multiplier: f32) -> bool {
        self.previous_tick_count = self.tick_count;
        if self.whole_ticks(self.accumulated) > self.tick_count {
            self.tick_count += 1;
            return false;
        }
        self.accumulated += self.pending;
        if self.whole_ticks(self.accumulated) > self.tick_count {
            self.tick_count += 1;
            self.last_tick_at = self.accumulated;
        }
        self.pending = f64::from(multiplier.max(0.0));
        true
    }

    /// `true` when the last call advanced the tick count.
    #[inline]
    pub fn tick_occurred(&self) -> bool {
        self.previous_tick_count < self.tick_count
    }

    /// `true` when the next call will advance the tick count.
    pub fn will_tick_next_call(&self) -> bool {
        self.whole_ticks(self.accumulated) > self.tick_count
            || self.whole_ticks(self.accumulated + self.pending) > self.tick_count
    }

    /// Progress towards the next logical tick, in `[0, 1]`.
    pub fn interpolation(&self) -> f32 {
        if self.will_tick_next_call() {
            return 1.0;
        }
        let since_tick = self.accumulated - self.last_tick_at;
        since_tick.clamp(0.0, 1.0) as f32
    }

    /// Logical ticks elapsed since the last reset.
    #[inline]
    pub fn tick_count(&self) -> i64 {
        self.tick_count
    }

    /// Multiplier that will be applied on the next call.
    #[inline]
    pub fn pending_multiplier(&self) -> f32 {
        self.pending as f32
    }

    #[inline]
    fn whole_ticks(&self, value: f64) -> i64 {
        value.floor() as i64
    }
}
