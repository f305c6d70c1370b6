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

//! The per-frame loop of one fight.

use crate::camera::CameraTracker;
use crate::hotkeys::CommandDispatcher;
use crate::snapshot::RoundSnapshot;
use versus_control::{LifeScaler, RoundController, RoundEvent, RoundTransition};
use versus_core::clock::{FramePacer, TickAccumulator};
use versus_core::config::RuntimeConfig;
use versus_core::entity::Roster;
use versus_core::platform::{EventPump, InputSource, RenderTarget, SystemTimeSource, TimeSource};
use versus_core::script::{MatchCommand, ScriptHost};
use versus_core::world::{FrameContext, World};

/// The services a fight runs on.
pub struct Collaborators {
    /// Presents frames.
    pub render: Box<dyn RenderTarget>,
    /// Window events and shortcuts.
    pub events: Box<dyn EventPump>,
    /// Player or replay input.
    pub input: Box<dyn InputSource>,
    /// The simulated world.
    pub world: Box<dyn World>,
    /// Runs hotkey and debug scripts.
    pub scripts: Box<dyn ScriptHost>,
}

/// Why a fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightOutcome {
    /// A side reached its required wins or the draw limit was hit.
    MatchOver,
    /// A turns side lost its active member; the next one must be loaded.
    NextMember,
    /// A reload was requested; every asset must be prepared again.
    Reload,
    /// Input synchronization failed.
    Aborted,
    /// The window asked to close.
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
struct FrameRequests {
    reset: bool,
    reload: bool,
    step: bool,
}

/// Drives fights frame by frame.
pub struct MatchLoop<T: TimeSource = SystemTimeSource> {
    pacer: FramePacer<T>,
    clock: TickAccumulator,
    camera: CameraTracker,
    dispatcher: CommandDispatcher,
    target_fps: u32,
    fast_forward_factor: u32,
    turbo: f32,
    debug_draw: bool,
    paused: bool,
    reset_background: bool,
}

impl<T: TimeSource> MatchLoop<T> {
    /// Creates a loop paced on `time`.
    pub fn new(config: &RuntimeConfig, time: T) -> Self {
        Self {
            pacer: FramePacer::new(time),
            clock: TickAccumulator::new(),
            camera: CameraTracker::new(),
            dispatcher: CommandDispatcher::new(),
            target_fps: config.target_fps,
            fast_forward_factor: config.replay_fast_forward_factor,
            turbo: config.turbo,
            debug_draw: config.debug.draw,
            paused: false,
            reset_background: false,
        }
    }

    /// Hotkey and console bindings.
    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }

    /// The frame pacer, also used to keep frames flowing between fights.
    pub fn pacer_mut(&mut self) -> &mut FramePacer<T> {
        &mut self.pacer
    }

    /// Current simulation speed multiplier.
    pub fn turbo(&self) -> f32 {
        self.turbo
    }

    /// Frames per second the loop paces at.
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Whether the stage restarts with every round.
    pub fn set_reset_background(&mut self, reset: bool) {
        self.reset_background = reset;
    }

    /// Runs a fight until the match ends, a member change or reload is
    /// needed, input fails, or the window closes.
    ///
    /// The life pools of `roster` must already be scaled for this fight.
    pub fn run(
        &mut self,
        collaborators: &mut Collaborators,
        round: &mut RoundController,
        roster: &mut Roster,
        scaler: &LifeScaler,
    ) -> FightOutcome {
        if let Err(e) = collaborators.input.synchronize() {
            log::error!("Input synchronization failed, aborting the match: {e}");
            return FightOutcome::Aborted;
        }

        let mut snapshot = RoundSnapshot::capture(roster, round);
        self.start_round(collaborators, round, roster, &snapshot);
        let startup = self.dispatcher.run_startup(collaborators.scripts.as_mut());
        let mut requests = self.apply_commands(startup);

        loop {
            let shortcuts = collaborators.events.take_shortcuts();
            let commands = self
                .dispatcher
                .dispatch(collaborators.scripts.as_mut(), &shortcuts);
            let issued = self.apply_commands(commands);
            requests.reset |= issued.reset;
            requests.reload |= issued.reload;
            requests.step |= issued.step;

            if requests.reset {
                log::info!("Rewinding round {}.", round.round_number());
                self.start_round(collaborators, round, roster, &snapshot);
            }
            if requests.reload {
                log::info!("Reload requested.");
                return FightOutcome::Reload;
            }

            let tick = self.clock.tick_occurred();
            if round.round_over(tick, collaborators.input.any_button()) {
                match scaler.finish_round(round, roster) {
                    RoundTransition::NextRound => {
                        snapshot = RoundSnapshot::capture(roster, round);
                        self.start_round(collaborators, round, roster, &snapshot);
                    }
                    RoundTransition::FightOver if round.match_over() => return FightOutcome::MatchOver,
                    RoundTransition::FightOver => return FightOutcome::NextMember,
                }
            }

            self.camera
                .update(collaborators.world.camera_bounds(), self.turbo);
            if tick && round.freeze().stage_runs() {
                collaborators.world.stage_action();
            }
            self.simulate(collaborators, round, roster, tick);

            let paused = self.paused && !requests.step;
            requests = FrameRequests::default();
            if !self.clock.add_logical_tick(if paused { 0.0 } else { self.turbo }) {
                collaborators.events.poll_events();
                if collaborators.events.should_close() {
                    return FightOutcome::Quit;
                }
                continue;
            }

            if !self.pacer.frame_skip() {
                self.draw(collaborators, roster);
            }
            let fps = if collaborators.input.is_replay() && collaborators.input.any_hard_button() {
                self.target_fps.saturating_mul(self.fast_forward_factor)
            } else {
                self.target_fps
            };
            if !self
                .pacer
                .advance(fps, collaborators.render.as_mut(), collaborators.events.as_mut())
            {
                return FightOutcome::Quit;
            }
            if let Err(e) = collaborators.input.update() {
                log::error!("Input lost during the match, aborting: {e}");
                return FightOutcome::Aborted;
            }
        }
    }

    fn apply_commands(&mut self, commands: Vec<MatchCommand>) -> FrameRequests {
        let mut requests = FrameRequests::default();
        for command in commands {
            match command {
                MatchCommand::ResetRound => requests.reset = true,
                MatchCommand::Reload => requests.reload = true,
                MatchCommand::SetTurbo(turbo) => self.turbo = turbo.max(0.0),
                MatchCommand::ToggleDebugDraw => self.debug_draw = !self.debug_draw,
                MatchCommand::TogglePause => self.paused = !self.paused,
                MatchCommand::Step => requests.step = true,
            }
        }
        requests
    }

    /// Rewinds to `snapshot` and sets up a fresh round.
    fn start_round(
        &mut self,
        collaborators: &mut Collaborators,
        round: &mut RoundController,
        roster: &mut Roster,
        snapshot: &RoundSnapshot,
    ) {
        snapshot.restore(roster, round);
        self.clock.reset();
        self.camera.reset();
        round.begin_round(roster);
        let world = collaborators.world.as_mut();
        world.clear_transient_effects();
        world.reset_camera();
        if self.reset_background {
            world.reset_stage();
        }
        world.begin_round(roster);
    }

    fn simulate(
        &mut self,
        collaborators: &mut Collaborators,
        round: &mut RoundController,
        roster: &mut Roster,
        tick: bool,
    ) {
        let freeze = if tick {
            round.begin_tick()
        } else {
            round.freeze().view()
        };
        let frame = FrameContext {
            tick,
            interpolation: self.clock.interpolation(),
            freeze,
            camera: self.camera.position(),
            scale: self.camera.scale(),
            intro_countdown: round.intro_countdown(),
            special_flags: round.special_flags(),
        };
        let report = collaborators.world.step(&frame, roster);
        self.camera.observe(&report);
        if !tick {
            return;
        }
        round.absorb(&report);
        match round.end_tick(roster) {
            Some(RoundEvent::FightStarted) => log::debug!("Fight started."),
            Some(RoundEvent::Finished { winner, kind }) => {
                log::debug!("Round decided: {kind:?}, winner {winner:?}.")
            }
            None => {}
        }
    }

    fn draw(&mut self, collaborators: &mut Collaborators, roster: &Roster) {
        let view = self
            .camera
            .view(collaborators.world.camera_bounds(), self.clock.interpolation());
        collaborators
            .world
            .draw(&view, roster, collaborators.render.as_mut());
        if !self.debug_draw {
            return;
        }
        let mut lines = Vec::new();
        for combatant in roster.iter() {
            let slot = combatant.slot();
            lines.push(format!(
                "{slot} {} life {}/{} power {}/{}",
                combatant.definition().name,
                combatant.life,
                combatant.life_max,
                combatant.power,
                combatant.power_max
            ));
            match collaborators.scripts.status(slot) {
                Ok(Some(status)) => lines.push(status),
                Ok(None) => {}
                Err(e) => log::warn!("{slot}: status script failed: {e}"),
            }
        }
        collaborators.render.draw_debug_text(&lines);
    }
}
