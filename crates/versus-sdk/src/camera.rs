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

//! Follows the world's focus point with a speed-adjusted scroll and zoom.

use versus_core::world::{CameraBounds, CameraView, StepReport};

/// Camera state carried between frames of a match.
///
/// Each frame [`update`](Self::update) moves the camera towards the focus
/// the world reported on the previous step, keeping the reported edges in
/// view, and [`observe`](Self::observe) takes in the next report.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTracker {
    position: [f32; 2],
    focus: [f32; 2],
    left: f32,
    right: f32,
    scale: f32,
    scale_mul: f32,
    draw_scale: Option<f32>,
    zoom_anchor: Option<[f32; 2]>,
}

impl Default for CameraTracker {
    fn default() -> Self {
        Self {
            position: [0.0; 2],
            focus: [0.0; 2],
            left: 0.0,
            right: 0.0,
            scale: 1.0,
            scale_mul: 1.0,
            draw_scale: None,
            zoom_anchor: None,
        }
    }
}

impl CameraTracker {
    /// A camera at the origin with no zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the round start state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Camera position used for simulation.
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    /// Current zoom scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Computes this frame's scroll and zoom.
    ///
    /// Below normal speed the zoom change is damped so slowed play does not
    /// zoom at full rate.
    pub fn update(&mut self, bounds: &dyn CameraBounds, turbo: f32) {
        if turbo < 1.0 {
            self.scale_mul = self.scale_mul.powf(turbo);
        }
        self.scale = bounds.clamp_scale(self.scale * self.scale_mul);

        let x = self.position[0];
        let drift = self.focus[0] - x;
        let mut margin = (bounds.field_width() / 2.0) / self.scale;
        if ((self.left + self.right) - drift * 2.0).abs() >= margin / 2.0 {
            margin = margin.min((drift - self.left).max(self.right - drift)).max(0.0);
        }
        let mut x = bounds.clamp_x(
            self.scale,
            (x + self.left + margin).min((x + self.right - margin).max(self.focus[0])),
        );
        if !bounds.zoom_enabled() {
            // Quarter-pixel steps keep unzoomed scrolling from jittering.
            x = (x * 4.0 - 0.5).ceil() / 4.0;
        }
        let y = bounds.clamp_y(self.scale, self.focus[1]);

        self.position = [x, y];
        self.focus = self.position;
    }

    /// Takes in the focus, edges and zoom the world reported.
    pub fn observe(&mut self, report: &StepReport) {
        self.focus = report.focus;
        self.left = report.leftmost;
        self.right = report.rightmost;
        self.scale_mul = report.scale_mul;
        self.draw_scale = report.draw_scale;
        self.zoom_anchor = report.zoom_anchor;
    }

    /// The view to draw with, honoring a zoom the world requested.
    pub fn view(&self, bounds: &dyn CameraBounds, interpolation: f32) -> CameraView {
        let [x, y] = self.position;
        let (position, scale) = match (self.draw_scale, self.zoom_anchor) {
            (Some(draw_scale), Some(anchor)) => {
                let scale = bounds.min_scale().max(draw_scale / bounds.base_scale());
                let x = bounds.clamp_x(scale, x + anchor[0] * (scale - self.scale) / scale);
                ([x, y + anchor[1]], scale)
            }
            _ => ([x, y], self.scale),
        };
        CameraView {
            position,
            scale,
            interpolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Field {
        zoom: bool,
    }

    impl CameraBounds for Field {
        fn field_width(&self) -> f32 {
            320.0
        }
        fn base_scale(&self) -> f32 {
            1.0
        }
        fn min_scale(&self) -> f32 {
            0.5
        }
        fn zoom_enabled(&self) -> bool {
            self.zoom
        }
        fn clamp_scale(&self, scale: f32) -> f32 {
            scale.clamp(0.5, 1.0)
        }
        fn clamp_x(&self, _scale: f32, x: f32) -> f32 {
            x.clamp(-100.0, 100.0)
        }
        fn clamp_y(&self, _scale: f32, y: f32) -> f32 {
            y
        }
    }

    fn report(focus: [f32; 2], leftmost: f32, rightmost: f32, scale_mul: f32) -> StepReport {
        StepReport {
            focus,
            leftmost,
            rightmost,
            scale_mul,
            ..Default::default()
        }
    }

    #[test]
    fn test_camera_follows_focus_inside_margins() {
        let field = Field { zoom: false };
        let mut camera = CameraTracker::new();
        camera.observe(&report([10.0, -4.0], -40.0, 60.0, 1.0));

        camera.update(&field, 1.0);

        assert_eq!(camera.position(), [10.0, -4.0]);
        assert_relative_eq!(camera.scale(), 1.0);
    }

    #[test]
    fn test_camera_stops_at_field_bounds() {
        let field = Field { zoom: false };
        let mut camera = CameraTracker::new();
        camera.observe(&report([500.0, 0.0], -40.0, 60.0, 1.0));

        camera.update(&field, 1.0);

        assert_relative_eq!(camera.position()[0], 100.0);
    }

    #[test]
    fn test_slow_motion_damps_zoom() {
        // --- 1. ARRANGE ---
        let field = Field { zoom: true };
        let mut camera = CameraTracker::new();
        camera.observe(&report([0.0, 0.0], 0.0, 0.0, 0.81));

        // --- 2. ACT ---
        camera.update(&field, 0.5);

        // --- 3. ASSERT ---
        assert_relative_eq!(camera.scale(), 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_fast_forward_keeps_zoom_rate() {
        let field = Field { zoom: true };
        let mut camera = CameraTracker::new();
        camera.observe(&report([0.0, 0.0], 0.0, 0.0, 0.81));

        camera.update(&field, 2.0);

        assert_relative_eq!(camera.scale(), 0.81, epsilon = 1e-5);
    }

    #[test]
    fn test_requested_draw_zoom_shifts_view() {
        let field = Field { zoom: true };
        let mut camera = CameraTracker::new();
        let mut zoomed = report([0.0, 0.0], 0.0, 0.0, 1.0);
        zoomed.draw_scale = Some(2.0);
        zoomed.zoom_anchor = Some([10.0, 5.0]);
        camera.observe(&zoomed);

        let view = camera.view(&field, 0.5);

        assert_relative_eq!(view.scale, 2.0);
        assert_relative_eq!(view.position[0], 5.0);
        assert_relative_eq!(view.position[1], 5.0);
        assert_relative_eq!(view.interpolation, 0.5);
    }
}
