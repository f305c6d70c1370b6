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

use anyhow::Result;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use versus_core::asset::{
    AssetBackends, AssetPayload, BehaviorCompiler, CompiledBehavior, EntityDecoder,
    NoDecodeContext, Portrait, PortraitKind, StageHandle, StageLoader,
};
use versus_core::config::{RoundRules, RuntimeConfig};
use versus_core::entity::Roster;
use versus_core::error::{LoadError, SyncError};
use versus_core::platform::{EventPump, InputSource, RenderTarget, TimeSource};
use versus_core::script::NullScriptHost;
use versus_core::selection::{
    Catalog, CatalogEntity, CatalogStage, MatchContext, RosterEntry, StageChoice,
};
use versus_core::team::{Side, SlotIndex, TeamConfiguration, TeamMode};
use versus_core::world::{CameraBounds, CameraView, FrameContext, StepReport, World};
use versus_core::EntityDefinition;
use versus_sdk::{Collaborators, Session, SessionOutcome};

// --- Test Setup: a headless world where one side takes damage every tick ---

#[derive(Clone, Default)]
struct ManualTime {
    now: Rc<Cell<Option<Instant>>>,
}

impl TimeSource for ManualTime {
    fn now(&self) -> Instant {
        match self.now.get() {
            Some(now) => now,
            None => {
                let start = Instant::now();
                self.now.set(Some(start));
                start
            }
        }
    }

    fn sleep(&self, duration: Duration) {
        let now = self.now();
        self.now.set(Some(now + duration));
    }
}

struct CountingTarget {
    presents: Rc<Cell<u32>>,
}

impl RenderTarget for CountingTarget {
    fn present(&mut self) {
        self.presents.set(self.presents.get() + 1);
    }
    fn clear_and_set_viewport(&mut self) {}
}

/// Asks to close after too many frames so a broken loop fails instead of
/// hanging.
struct FramePump {
    polls: u32,
}

impl EventPump for FramePump {
    fn poll_events(&mut self) {
        self.polls += 1;
    }
    fn should_close(&self) -> bool {
        self.polls > 200_000
    }
}

struct Idle {
    sync: Result<(), SyncError>,
}

impl InputSource for Idle {
    fn synchronize(&mut self) -> Result<(), SyncError> {
        std::mem::replace(&mut self.sync, Ok(()))
    }
    fn any_button(&self) -> bool {
        false
    }
}

struct Arena;

impl CameraBounds for Arena {
    fn field_width(&self) -> f32 {
        320.0
    }
    fn base_scale(&self) -> f32 {
        1.0
    }
    fn min_scale(&self) -> f32 {
        1.0
    }
    fn zoom_enabled(&self) -> bool {
        false
    }
    fn clamp_scale(&self, _scale: f32) -> f32 {
        1.0
    }
    fn clamp_x(&self, _scale: f32, x: f32) -> f32 {
        x.clamp(-160.0, 160.0)
    }
    fn clamp_y(&self, _scale: f32, y: f32) -> f32 {
        y
    }
}

struct Beating {
    victim: Side,
    rounds: Rc<Cell<u32>>,
    bounds: Arena,
}

impl World for Beating {
    fn clear_transient_effects(&mut self) {}
    fn reset_camera(&mut self) {}
    fn reset_stage(&mut self) {}
    fn clear_slot(&mut self, _slot: SlotIndex) {}
    fn begin_round(&mut self, _roster: &mut Roster) {
        self.rounds.set(self.rounds.get() + 1);
    }
    fn stage_action(&mut self) {}

    fn step(&mut self, frame: &FrameContext, roster: &mut Roster) -> StepReport {
        if frame.tick && frame.intro_countdown == 0 {
            for combatant in roster.iter_mut().filter(|c| c.side() == self.victim) {
                combatant.life -= 250;
            }
        }
        StepReport {
            leftmost: -60.0,
            rightmost: 60.0,
            scale_mul: 1.0,
            ..Default::default()
        }
    }

    fn draw(&mut self, _view: &CameraView, _roster: &Roster, _target: &mut dyn RenderTarget) {}

    fn camera_bounds(&self) -> &dyn CameraBounds {
        &self.bounds
    }
}

struct Compiler;
impl BehaviorCompiler for Compiler {
    fn compile(&self, _slot: SlotIndex, _definition: &Path) -> Result<CompiledBehavior, LoadError> {
        Ok(CompiledBehavior::new(()))
    }
}

struct Decoder;
impl EntityDecoder for Decoder {
    fn decode(&self, definition: &Path) -> Result<EntityDefinition, LoadError> {
        let name = definition
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(EntityDefinition::new(name, definition))
    }
    fn decode_portrait(&self, _: &Path, kind: PortraitKind, _: u32) -> Result<Portrait, LoadError> {
        Ok(Portrait {
            kind,
            image: AssetPayload::empty(),
        })
    }
}

struct Stages;
impl StageLoader for Stages {
    fn load(&self, definition: &Path) -> Result<StageHandle, LoadError> {
        if definition.ends_with("missing.def") {
            return Err(LoadError::Stage {
                definition: definition.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }
        Ok(StageHandle {
            definition: definition.to_path_buf(),
            name: "stage".to_string(),
            music: None,
            reset_background: true,
            data: AssetPayload::empty(),
        })
    }
}

fn backends() -> AssetBackends {
    AssetBackends {
        compiler: Arc::new(Compiler),
        entities: Arc::new(Decoder),
        stages: Arc::new(Stages),
        decode_context: Arc::new(NoDecodeContext),
    }
}

fn context() -> Arc<MatchContext> {
    let entity = |name: &str| CatalogEntity {
        name: name.to_string(),
        definition: PathBuf::from(format!("chars/{name}.def")),
    };
    let stage = |name: &str| CatalogStage {
        name: name.to_string(),
        definition: PathBuf::from(format!("stages/{name}.def")),
    };
    Arc::new(MatchContext::new(Catalog::new(
        vec![entity("kfm"), entity("ryu"), entity("ken")],
        vec![stage("temple"), stage("missing")],
    )))
}

fn config(teams: [TeamConfiguration; 2]) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.rules = RoundRules {
        hit_stun_time: 1,
        wait_time: 1,
        win_time: 1,
        start_wait_time: 2,
        ctrl_time: 2,
        ..Default::default()
    };
    config.teams = teams;
    config.loader.poll_interval_ms = 1;
    config.loader.rng_seed = Some(3);
    config
}

fn team(mode: TeamMode, roster_size: u32, wins: u32) -> TeamConfiguration {
    TeamConfiguration {
        mode,
        roster_size,
        match_wins_required: wins,
    }
}

struct Harness {
    collaborators: Collaborators,
    rounds: Rc<Cell<u32>>,
    presents: Rc<Cell<u32>>,
}

fn harness(victim: Side, sync: Result<(), SyncError>) -> Harness {
    let rounds = Rc::new(Cell::new(0));
    let presents = Rc::new(Cell::new(0));
    let collaborators = Collaborators {
        render: Box::new(CountingTarget {
            presents: Rc::clone(&presents),
        }),
        events: Box::new(FramePump { polls: 0 }),
        input: Box::new(Idle { sync }),
        world: Box::new(Beating {
            victim,
            rounds: Rc::clone(&rounds),
            bounds: Arena,
        }),
        scripts: Box::new(NullScriptHost),
    };
    Harness {
        collaborators,
        rounds,
        presents,
    }
}

fn pick(entity: usize) -> RosterEntry {
    RosterEntry { entity, palette: 1 }
}

#[test]
fn test_single_match_is_played_to_the_end() -> Result<()> {
    // --- 1. ARRANGE ---
    let context = context();
    context.select_entity(Side::One, pick(0));
    context.select_entity(Side::Two, pick(1));
    context.select_stage(StageChoice::Index(0));
    let h = harness(Side::Two, Ok(()));
    let teams = [team(TeamMode::Single, 1, 2); 2];
    let mut session = Session::new(config(teams), context, backends(), h.collaborators, ManualTime::default());

    // --- 2. ACT ---
    let outcome = session.run()?;

    // --- 3. ASSERT ---
    match outcome {
        SessionOutcome::MatchOver(score) => {
            assert_eq!(score.match_wins, [2, 0]);
            assert_eq!(score.draws, 0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(h.rounds.get(), 2);
    assert!(h.presents.get() > 0);
    assert_eq!(session.round().round_number(), 3);
    Ok(())
}

#[test]
fn test_consecutive_runs_start_fresh_matches() -> Result<()> {
    // --- 1. ARRANGE ---
    let context = context();
    context.select_entity(Side::One, pick(0));
    context.select_entity(Side::Two, pick(1));
    context.select_stage(StageChoice::Index(0));
    let h = harness(Side::Two, Ok(()));
    let teams = [team(TeamMode::Single, 1, 2); 2];
    let mut session = Session::new(config(teams), context, backends(), h.collaborators, ManualTime::default());

    // --- 2. ACT ---
    let first = session.run()?;
    let second = session.run()?;

    // --- 3. ASSERT ---
    for outcome in [first, second] {
        match outcome {
            SessionOutcome::MatchOver(score) => assert_eq!(score.match_wins, [2, 0]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    // Each match plays its own two rounds.
    assert_eq!(h.rounds.get(), 4);
    assert_eq!(session.round().round_number(), 3);
    assert_eq!(session.round().rounds_played(), [2, 2]);
    Ok(())
}

#[test]
fn test_turns_side_sends_its_next_member() -> Result<()> {
    // --- 1. ARRANGE ---
    let context = context();
    context.select_entity(Side::One, pick(0));
    context.select_entity(Side::One, pick(2));
    context.select_entity(Side::Two, pick(1));
    context.select_stage(StageChoice::Index(0));
    let h = harness(Side::One, Ok(()));
    let teams = [team(TeamMode::Turns, 2, 2), team(TeamMode::Single, 1, 2)];
    let mut session = Session::new(config(teams), context, backends(), h.collaborators, ManualTime::default());

    // --- 2. ACT ---
    let outcome = session.run()?;

    // --- 3. ASSERT ---
    assert_eq!(
        outcome,
        SessionOutcome::MatchOver(versus_control::round::Score {
            match_wins: [0, 2],
            draws: 0,
        })
    );
    let leader = session.roster().get(SlotIndex::leader(Side::One)).unwrap();
    assert_eq!(leader.definition().name, "ken");
    assert_eq!(h.rounds.get(), 2);
    Ok(())
}

#[test]
fn test_stage_failure_is_surfaced() {
    let context = context();
    context.select_entity(Side::One, pick(0));
    context.select_entity(Side::Two, pick(1));
    context.select_stage(StageChoice::Index(1));
    let h = harness(Side::Two, Ok(()));
    let teams = [team(TeamMode::Single, 1, 2); 2];
    let mut session = Session::new(config(teams), context, backends(), h.collaborators, ManualTime::default());

    let error = session.run().unwrap_err();

    assert!(error.chain().any(|cause| cause.to_string().contains("missing.def")));
    assert_eq!(h.rounds.get(), 0);
}

#[test]
fn test_lost_synchronization_aborts_the_match() -> Result<()> {
    let context = context();
    context.select_entity(Side::One, pick(0));
    context.select_entity(Side::Two, pick(1));
    context.select_stage(StageChoice::Index(0));
    let h = harness(Side::Two, Err(SyncError::Disconnected("peer left".to_string())));
    let teams = [team(TeamMode::Single, 1, 2); 2];
    let mut session = Session::new(config(teams), context, backends(), h.collaborators, ManualTime::default());

    assert_eq!(session.run()?, SessionOutcome::Aborted);
    assert_eq!(h.rounds.get(), 0);
    Ok(())
}
