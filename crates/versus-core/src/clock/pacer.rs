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

use crate::platform::{EventPump, RenderTarget, SystemTimeSource, TimeSource};
use std::time::{Duration, Instant};

/// Extra slack accepted on top of one interval before sleeping is skipped.
const SLEEP_SLACK: Duration = Duration::from_millis(2);
/// A render gap longer than this means the process was stalled.
const STALL_THRESHOLD: Duration = Duration::from_millis(250);
/// Lateness still treated as on time.
const LATE_TOLERANCE: Duration = Duration::from_millis(17);
/// Lateness beyond which the schedule is rebuilt from the current time.
const RESYNC_THRESHOLD: Duration = Duration::from_millis(150);

/// How a paced frame was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceDecision {
    /// Ahead of schedule; slept until the deadline.
    Slept(Duration),
    /// The previous render is long past; render without catching up.
    Stalled,
    /// Slightly late or far ahead; render now.
    OnTime,
    /// Too late; skip rendering the next frame.
    Skip {
        /// The schedule was restarted from the current time.
        resynced: bool,
    },
}

/// Paces presented frames against a wall-clock schedule.
///
/// The deadline advances by exactly one interval per call whatever the
/// outcome, so the long-run frame rate matches the target. Frames that
/// fall too far behind are skipped rather than rendered late.
#[derive(Debug)]
pub struct FramePacer<T: TimeSource = SystemTimeSource> {
    time: T,
    next_deadline: Option<Instant>,
    last_render: Option<Instant>,
    frame_skip: bool,
}

impl Default for FramePacer<SystemTimeSource> {
    fn default() -> Self {
        Self::new(SystemTimeSource)
    }
}

impl<T: TimeSource> FramePacer<T> {
    /// Creates a pacer over a time source.
    pub fn new(time: T) -> Self {
        Self {
            time,
            next_deadline: None,
            last_render: None,
            frame_skip: false,
        }
    }

    /// `true` when the next frame must not be rendered or presented.
    #[inline]
    pub fn frame_skip(&self) -> bool {
        self.frame_skip
    }

    /// The time source the pacer sleeps on.
    pub fn time_source(&self) -> &T {
        &self.time
    }

    /// Ends the current frame and waits for the next one.
    ///
    /// Presents the frame unless it was skipped, paces against the
    /// schedule, processes window events and prepares the back buffer.
    /// Returns `false` once the window asked to close.
    pub fn advance(
        &mut self,
        target_fps: u32,
        target: &mut dyn RenderTarget,
        events: &mut dyn EventPump,
    ) -> bool {
        if !self.frame_skip {
            target.present();
        }
        self.pace(target_fps);
        events.poll_events();
        if !self.frame_skip {
            target.clear_and_set_viewport();
        }
        !events.should_close()
    }

    /// Applies the pacing rules for one frame and returns the decision.
    pub fn pace(&mut self, target_fps: u32) -> PaceDecision {
        let interval = Duration::from_secs(1) / target_fps.max(1);
        let now = self.time.now();
        let deadline = self.next_deadline.unwrap_or(now);
        self.next_deadline = Some(deadline + interval);

        let ahead = deadline.checked_duration_since(now);
        let behind = now.saturating_duration_since(deadline);
        let stalled = self
            .last_render
            .map_or(true, |last| now.saturating_duration_since(last) > STALL_THRESHOLD);

        let decision = match ahead {
            Some(wait) if wait < interval + SLEEP_SLACK => {
                self.time.sleep(wait);
                PaceDecision::Slept(wait)
            }
            _ if stalled => PaceDecision::Stalled,
            Some(_) => PaceDecision::OnTime,
            None if behind <= LATE_TOLERANCE => PaceDecision::OnTime,
            None => {
                let resynced = behind > RESYNC_THRESHOLD;
                if resynced {
                    self.next_deadline = Some(now + interval);
                    log::debug!("Frame pacer resynchronized after falling {behind:?} behind.");
                }
                PaceDecision::Skip { resynced }
            }
        };

        match decision {
            PaceDecision::Skip { .. } => {
                if !self.frame_skip {
                    log::trace!("Frame pacer started skipping frames.");
                }
                self.frame_skip = true;
            }
            _ => {
                self.last_render = Some(now);
                self.frame_skip = false;
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// A clock that only moves when told to, or when the pacer sleeps.
    struct ManualTime {
        now: Cell<Instant>,
        slept: RefCell<Vec<Duration>>,
    }

    impl ManualTime {
        fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
                slept: RefCell::new(Vec::new()),
            }
        }

        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl TimeSource for ManualTime {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    #[derive(Default)]
    struct Surface {
        presents: u32,
        clears: u32,
    }

    impl RenderTarget for Surface {
        fn present(&mut self) {
            self.presents += 1;
        }
        fn clear_and_set_viewport(&mut self) {
            self.clears += 1;
        }
    }

    #[derive(Default)]
    struct Window {
        polls: u32,
        close: bool,
    }

    impl EventPump for Window {
        fn poll_events(&mut self) {
            self.polls += 1;
        }
        fn should_close(&self) -> bool {
            self.close
        }
    }

    const FRAME: Duration = Duration::from_micros(16_666);

    #[test]
    fn test_fast_frames_sleep_until_deadline() {
        // --- 1. ARRANGE ---
        let mut pacer = FramePacer::new(ManualTime::new());
        pacer.pace(60);

        // --- 2. ACT ---
        pacer.time_source().advance(Duration::from_millis(5));
        let decision = pacer.pace(60);

        // --- 3. ASSERT ---
        assert!(matches!(decision, PaceDecision::Slept(d) if d < FRAME));
        assert!(!pacer.frame_skip());
    }

    #[test]
    fn test_small_lateness_is_on_time() {
        let mut pacer = FramePacer::new(ManualTime::new());
        pacer.pace(60);
        pacer.time_source().advance(FRAME + Duration::from_millis(10));
        assert_eq!(pacer.pace(60), PaceDecision::OnTime);
        assert!(!pacer.frame_skip());
    }

    #[test]
    fn test_large_lateness_skips_and_resyncs() {
        let mut pacer = FramePacer::new(ManualTime::new());
        pacer.pace(60);
        pacer.time_source().advance(FRAME);
        pacer.pace(60);

        // 60 ms late: skip without resync.
        pacer.time_source().advance(Duration::from_millis(90));
        assert_eq!(pacer.pace(60), PaceDecision::Skip { resynced: false });
        assert!(pacer.frame_skip());

        // 200 ms late while the last render was recent enough: resync.
        pacer.time_source().advance(Duration::from_millis(150));
        assert_eq!(pacer.pace(60), PaceDecision::Skip { resynced: true });

        // After a resync the next frame is back on schedule.
        pacer.time_source().advance(Duration::from_millis(1));
        assert!(matches!(pacer.pace(60), PaceDecision::Slept(_)));
        assert!(!pacer.frame_skip());
    }

    #[test]
    fn test_stall_forces_render() {
        let mut pacer = FramePacer::new(ManualTime::new());
        pacer.pace(60);
        pacer.time_source().advance(Duration::from_secs(2));
        assert_eq!(pacer.pace(60), PaceDecision::Stalled);
        assert!(!pacer.frame_skip());
    }

    #[test]
    fn test_advance_skips_present_and_clear_while_skipping() {
        let mut pacer = FramePacer::new(ManualTime::new());
        let mut surface = Surface::default();
        let mut window = Window::default();

        assert!(pacer.advance(60, &mut surface, &mut window));
        pacer.time_source().advance(Duration::from_millis(100));
        assert!(pacer.advance(60, &mut surface, &mut window));
        assert!(pacer.frame_skip());
        window.close = true;
        assert!(!pacer.advance(60, &mut surface, &mut window));

        // First two frames present; the skipped one neither presents nor clears.
        assert_eq!(surface.presents, 2);
        assert_eq!(surface.clears, 1);
        assert_eq!(window.polls, 3);
    }
}
