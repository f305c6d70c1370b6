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

//! The contract of the simulated world: entities, helpers, effects, the
//! stage and the camera limits it imposes.

use crate::entity::Roster;
use crate::platform::RenderTarget;
use crate::team::SlotIndex;
use crate::versus_bitflags;

versus_bitflags! {
    /// Global conditions entities assert for the current tick.
    pub struct SpecialFlags: u32 {
        /// The intro is playing.
        const INTRO = 1 << 0;
        /// Keeps the round from being decided.
        const ROUND_NOT_OVER = 1 << 1;
        /// Mutes the stage music.
        const NO_MUSIC = 1 << 2;
        /// Hides the life bars.
        const NO_BAR_DISPLAY = 1 << 3;
        /// Hides the stage background.
        const NO_BG = 1 << 4;
        /// Hides the stage foreground.
        const NO_FG = 1 << 5;
        /// Disables every shadow.
        const GLOBAL_NO_SHADOW = 1 << 6;
        /// Stops the round timer.
        const TIMER_FREEZE = 1 << 7;
        /// Silences the knockout announcement.
        const NO_KO_SOUND = 1 << 8;
        /// Disables the knockout slow motion.
        const NO_KO_SLOW = 1 << 9;
    }
}

/// Which global freeze a world event requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeKind {
    /// A regular pause.
    Pause,
    /// A super pause; takes precedence over a regular pause.
    Super,
}

/// A request to start a global freeze, raised by an entity during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeRequest {
    /// Which freeze to start.
    pub kind: FreezeKind,
    /// Raw duration in ticks. Negative values arm the freeze so it starts
    /// on the next tick instead of this one.
    pub duration: i32,
    /// Slot that requested the freeze; it keeps moving while others wait.
    pub owner: SlotIndex,
    /// Whether the stage background stops too.
    pub pause_background: bool,
    /// Ticks before the end at which buffered commands are accepted again.
    pub end_command_buffer_time: i32,
}

/// Freeze state handed to the world for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreezeView {
    /// A regular pause is running.
    pub pause: bool,
    /// A super pause is running.
    pub super_pause: bool,
    /// Slot exempt from the running freeze.
    pub owner: Option<SlotIndex>,
    /// Frozen entities still buffer commands; the freeze is about to end.
    pub buffer_commands: bool,
}

/// What the world should do this iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// A logical tick elapsed; simulate. Otherwise only interpolate.
    pub tick: bool,
    /// Fraction of the way to the next logical tick.
    pub interpolation: f32,
    /// Active freezes.
    pub freeze: FreezeView,
    /// Camera position the world tracks entities against.
    pub camera: [f32; 2],
    /// Camera scale.
    pub scale: f32,
    /// Intro countdown of the round; positive during the intro.
    pub intro_countdown: i32,
    /// Global conditions currently asserted.
    pub special_flags: SpecialFlags,
}

/// What the world reports after a simulated tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepReport {
    /// Point the camera should follow.
    pub focus: [f32; 2],
    /// Distance of the left-most entity from the camera center.
    pub leftmost: f32,
    /// Distance of the right-most entity from the camera center.
    pub rightmost: f32,
    /// Zoom multiplier requested for the next tick.
    pub scale_mul: f32,
    /// Scale override requested by a zoom effect.
    pub draw_scale: Option<f32>,
    /// Zoom anchor offset from the camera center.
    pub zoom_anchor: Option<[f32; 2]>,
    /// An entity ended the round with a special finish.
    pub special_finish: bool,
    /// Global freezes requested during the tick.
    pub freeze_requests: Vec<FreezeRequest>,
    /// Global conditions asserted during the tick.
    pub special_flags: SpecialFlags,
}

/// Camera placement for one drawn frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Camera center.
    pub position: [f32; 2],
    /// Scale to draw with.
    pub scale: f32,
    /// Interpolation factor for sub-tick motion.
    pub interpolation: f32,
}

/// Limits the stage imposes on the camera.
pub trait CameraBounds {
    /// Width of the visible field at scale 1.
    fn field_width(&self) -> f32;
    /// Default scale of the stage.
    fn base_scale(&self) -> f32;
    /// Smallest scale the camera may zoom out to.
    fn min_scale(&self) -> f32;
    /// `true` when the stage allows zooming.
    fn zoom_enabled(&self) -> bool;
    /// Clamps a scale to the stage limits.
    fn clamp_scale(&self, scale: f32) -> f32;
    /// Clamps a horizontal position at `scale`.
    fn clamp_x(&self, scale: f32, x: f32) -> f32;
    /// Clamps a vertical position at `scale`.
    fn clamp_y(&self, scale: f32, y: f32) -> f32;
}

/// The simulated world of a fight.
pub trait World {
    /// Drops global visual effects left from the previous round.
    fn clear_transient_effects(&mut self);
    /// Resets the camera zoom delay and the entity id cache.
    fn reset_camera(&mut self);
    /// Restarts the stage background.
    fn reset_stage(&mut self);
    /// Removes helpers and projectiles of a slot and puts its entity back
    /// at its start position with a cleared state.
    fn clear_slot(&mut self, slot: SlotIndex);
    /// Puts every active entity into its round-start state.
    fn begin_round(&mut self, roster: &mut Roster);
    /// Runs the stage's own per-tick animation.
    fn stage_action(&mut self);
    /// Simulates or interpolates one iteration.
    fn step(&mut self, frame: &FrameContext, roster: &mut Roster) -> StepReport;
    /// Draws the world.
    fn draw(&mut self, view: &CameraView, roster: &Roster, target: &mut dyn RenderTarget);
    /// Limits of the current stage.
    fn camera_bounds(&self) -> &dyn CameraBounds;
}
