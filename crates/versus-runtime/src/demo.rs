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

//! Headless stand-ins for the renderer, window, input, world, script host
//! and asset backends, enough to play a match without any assets on disk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use versus_core::asset::{
    AssetBackends, AssetPayload, BehaviorCompiler, CompiledBehavior, EntityDecoder,
    NoDecodeContext, Portrait, PortraitKind, StageHandle, StageLoader,
};
use versus_core::config::RuntimeConfig;
use versus_core::entity::Roster;
use versus_core::error::{LoadError, ScriptError};
use versus_core::platform::{EventPump, InputSource, RenderTarget};
use versus_core::script::{MatchCommand, ScriptHost, ShortcutKey};
use versus_core::selection::{Catalog, CatalogEntity, CatalogStage, MatchContext, RosterEntry, StageChoice};
use versus_core::team::{Side, SlotIndex};
use versus_core::world::{CameraBounds, CameraView, FrameContext, StepReport, World};
use versus_core::EntityDefinition;
use versus_sdk::Collaborators;

/// Frames after which the headless window closes itself.
const FRAME_BUDGET: u64 = 60 * 60 * 5;

const ENTITIES: [&str; 4] = ["kfm", "ryu", "ken", "chun"];
const STAGES: [&str; 2] = ["training", "temple"];

/// Catalog of the demo entities and stages.
pub fn catalog() -> Catalog {
    let entities = ENTITIES
        .iter()
        .map(|name| CatalogEntity {
            name: name.to_string(),
            definition: PathBuf::from(format!("chars/{name}/{name}.def")),
        })
        .collect();
    let stages = STAGES
        .iter()
        .map(|name| CatalogStage {
            name: name.to_string(),
            definition: PathBuf::from(format!("stages/{name}.def")),
        })
        .collect();
    Catalog::new(entities, stages)
}

/// Fills both rosters as the select screen would, and picks a random stage.
pub fn select(context: &MatchContext, config: &RuntimeConfig) {
    context.clear_selection();
    for side in Side::BOTH {
        let team = config.teams[side.index()];
        for member in 0..team.roster_size as usize {
            let entity = (side.index() + member * 2) % ENTITIES.len();
            context.select_entity(
                side,
                RosterEntry {
                    entity,
                    palette: 1 + side.index() as u32,
                },
            );
        }
    }
    context.select_stage(StageChoice::Random);
}

/// Backends that synthesize assets from definition paths.
pub fn backends() -> AssetBackends {
    AssetBackends {
        compiler: Arc::new(DemoCompiler),
        entities: Arc::new(DemoDecoder),
        stages: Arc::new(DemoStages),
        decode_context: Arc::new(NoDecodeContext),
    }
}

/// Collaborators for a headless match.
pub fn collaborators(seed: u64) -> Collaborators {
    Collaborators {
        render: Box::new(HeadlessTarget::default()),
        events: Box::new(HeadlessWindow::default()),
        input: Box::new(IdleInput),
        world: Box::new(DemoWorld::new(seed)),
        scripts: Box::new(CommandHost),
    }
}

/// Default hotkeys of the demo.
pub fn hotkeys() -> [(ShortcutKey, &'static str); 4] {
    [
        (ShortcutKey::plain(0x3B).with_ctrl(), "reset"),
        (ShortcutKey::plain(0x3C).with_ctrl(), "reload"),
        (ShortcutKey::plain(0x3D), "debug"),
        (ShortcutKey::plain(0x13), "pause"),
    ]
}

fn stem(definition: &Path) -> String {
    definition
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

struct DemoCompiler;

impl BehaviorCompiler for DemoCompiler {
    fn compile(&self, slot: SlotIndex, definition: &Path) -> Result<CompiledBehavior, LoadError> {
        let name = stem(definition);
        if name.is_empty() {
            return Err(LoadError::Compile {
                slot,
                definition: definition.to_path_buf(),
                reason: "definition has no name".to_string(),
            });
        }
        // The only behavior a demo entity has is how hard it hits.
        let aggression = name.bytes().map(u32::from).sum::<u32>() % 30 + 20;
        Ok(CompiledBehavior::new(aggression))
    }
}

struct DemoDecoder;

impl EntityDecoder for DemoDecoder {
    fn decode(&self, definition: &Path) -> Result<EntityDefinition, LoadError> {
        let mut decoded = EntityDefinition::new(stem(definition), definition);
        decoded.palette_keymap = vec![1, 2, 3];
        Ok(decoded)
    }

    fn decode_portrait(
        &self,
        _definition: &Path,
        kind: PortraitKind,
        _palette_no: u32,
    ) -> Result<Portrait, LoadError> {
        Ok(Portrait {
            kind,
            image: AssetPayload::empty(),
        })
    }
}

struct DemoStages;

impl StageLoader for DemoStages {
    fn load(&self, definition: &Path) -> Result<StageHandle, LoadError> {
        Ok(StageHandle {
            definition: definition.to_path_buf(),
            name: stem(definition),
            music: None,
            reset_background: true,
            data: AssetPayload::empty(),
        })
    }
}

#[derive(Default)]
struct HeadlessTarget {
    frames: u64,
}

impl RenderTarget for HeadlessTarget {
    fn present(&mut self) {
        self.frames += 1;
    }

    fn clear_and_set_viewport(&mut self) {}

    fn draw_debug_text(&mut self, lines: &[String]) {
        for line in lines {
            log::trace!("[frame {}] {line}", self.frames);
        }
    }
}

#[derive(Default)]
struct HeadlessWindow {
    polls: u64,
}

impl EventPump for HeadlessWindow {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn should_close(&self) -> bool {
        self.polls >= FRAME_BUDGET
    }
}

struct IdleInput;

impl InputSource for IdleInput {
    fn any_button(&self) -> bool {
        false
    }
}

/// Understands one command per line: `reset`, `reload`, `turbo <x>`,
/// `debug`, `pause` and `step`.
struct CommandHost;

impl ScriptHost for CommandHost {
    fn execute(&mut self, source: &str) -> Result<Vec<MatchCommand>, ScriptError> {
        source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(' ') {
                Some(("turbo", value)) => value
                    .trim()
                    .parse()
                    .map(MatchCommand::SetTurbo)
                    .map_err(|_| ScriptError::Execution(format!("invalid turbo '{value}'"))),
                _ => match line {
                    "reset" => Ok(MatchCommand::ResetRound),
                    "reload" => Ok(MatchCommand::Reload),
                    "debug" => Ok(MatchCommand::ToggleDebugDraw),
                    "pause" => Ok(MatchCommand::TogglePause),
                    "step" => Ok(MatchCommand::Step),
                    other => Err(ScriptError::Execution(format!("unknown command '{other}'"))),
                },
            })
            .collect()
    }

    fn status(&mut self, slot: SlotIndex) -> Result<Option<String>, ScriptError> {
        Ok(Some(format!("{slot} ok")))
    }
}

struct DemoBounds;

impl CameraBounds for DemoBounds {
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
        false
    }
    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale(), 1.0)
    }
    fn clamp_x(&self, scale: f32, x: f32) -> f32 {
        let reach = 240.0 - self.field_width() / 2.0 / scale;
        x.clamp(-reach.max(0.0), reach.max(0.0))
    }
    fn clamp_y(&self, _scale: f32, y: f32) -> f32 {
        y.min(0.0)
    }
}

/// Two lines of fighters trading random blows.
struct DemoWorld {
    rng: StdRng,
    seed: u64,
    bounds: DemoBounds,
    positions: [f32; 8],
}

impl DemoWorld {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            bounds: DemoBounds,
            positions: [0.0; 8],
        }
    }
}

impl World for DemoWorld {
    fn clear_transient_effects(&mut self) {}

    fn reset_camera(&mut self) {}

    fn reset_stage(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn clear_slot(&mut self, slot: SlotIndex) {
        self.positions[slot.index()] = 0.0;
    }

    fn begin_round(&mut self, roster: &mut Roster) {
        for combatant in roster.iter() {
            let slot = combatant.slot();
            let direction = if slot.side() == Side::One { -1.0 } else { 1.0 };
            self.positions[slot.index()] = direction * (70.0 + 20.0 * slot.member() as f32);
        }
    }

    fn stage_action(&mut self) {}

    fn step(&mut self, frame: &FrameContext, roster: &mut Roster) -> StepReport {
        let fighting = frame.tick && frame.intro_countdown == 0 && !frame.freeze.pause && !frame.freeze.super_pause;
        if fighting {
            let attacker = if self.rng.gen_bool(0.5) { Side::One } else { Side::Two };
            let damage = self.rng.gen_range(5..45);
            let target = roster.side(attacker.opponent()).find(|c| !c.is_knocked_out()).map(|c| c.slot());
            if let Some(target) = target {
                if let Some(combatant) = roster.get_mut(target) {
                    combatant.life -= damage;
                }
                if let Some(striker) = roster.get_mut(SlotIndex::leader(attacker)) {
                    striker.power = (striker.power + damage).min(striker.power_max);
                }
            }
        }

        let occupied: Vec<f32> = roster.iter().map(|c| self.positions[c.slot().index()]).collect();
        let leftmost = occupied.iter().copied().fold(0.0_f32, f32::min);
        let rightmost = occupied.iter().copied().fold(0.0_f32, f32::max);
        let centre = (leftmost + rightmost) / 2.0;
        StepReport {
            focus: [centre, 0.0],
            leftmost: leftmost - frame.camera[0],
            rightmost: rightmost - frame.camera[0],
            scale_mul: 1.0,
            ..Default::default()
        }
    }

    fn draw(&mut self, view: &CameraView, roster: &Roster, target: &mut dyn RenderTarget) {
        if log::log_enabled!(log::Level::Trace) {
            let lives: Vec<String> = roster.iter().map(|c| format!("{}:{}", c.slot(), c.life)).collect();
            target.draw_debug_text(&[format!("camera {:?} x{:.2} {}", view.position, view.scale, lives.join(" "))]);
        }
    }

    fn camera_bounds(&self) -> &dyn CameraBounds {
        &self.bounds
    }
}
