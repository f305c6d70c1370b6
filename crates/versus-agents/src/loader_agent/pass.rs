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

use super::cache::AssetCache;
use super::slot::{requirement, retire_followers, LoadPlan, SlotRequirement};
use super::state::{LoaderState, SharedState};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use versus_core::asset::{AssetBackends, ContextBinding, LoadedEntity, PortraitKind, StageHandle};
use versus_core::error::LoadError;
use versus_core::selection::{MatchContext, StageChoice};
use versus_core::team::{Side, SlotIndex, TeamMode, MAX_SLOTS};
use versus_core::Stopwatch;

/// Everything a completed pass prepared.
#[derive(Debug, Clone)]
pub struct MatchAssets {
    /// Loaded entity of each active slot.
    pub entities: [Option<Arc<LoadedEntity>>; MAX_SLOTS],
    /// The stage.
    pub stage: Arc<StageHandle>,
}

impl MatchAssets {
    /// Entity prepared for `slot`, `None` when the slot is inactive.
    pub fn entity(&self, slot: SlotIndex) -> Option<&Arc<LoadedEntity>> {
        self.entities[slot.index()].as_ref()
    }
}

/// Which parts of the running pass are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassProgress {
    /// Per slot: loaded or known to be inactive.
    pub slots_done: [bool; MAX_SLOTS],
    /// The stage is loaded.
    pub stage_done: bool,
}

impl PassProgress {
    /// `true` once every slot and the stage are done.
    pub fn is_done(&self) -> bool {
        self.stage_done && self.slots_done.iter().all(|done| *done)
    }
}

/// How a pass ended, handed back to the loader.
#[derive(Debug)]
pub(crate) enum PassOutcome {
    Complete(MatchAssets),
    Failed(LoadError),
    Cancelled,
}

#[derive(Debug, Clone)]
enum SlotProgress {
    Pending,
    Inactive,
    Loaded(Arc<LoadedEntity>),
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovering a poisoned loader lock.");
        PoisonError::into_inner(poisoned)
    })
}

/// One background attempt at preparing a match.
pub(crate) struct LoadPass {
    pub(crate) context: Arc<MatchContext>,
    pub(crate) backends: AssetBackends,
    pub(crate) plan: LoadPlan,
    pub(crate) cache: Arc<Mutex<AssetCache>>,
    pub(crate) state: SharedState,
    pub(crate) progress: Arc<Mutex<PassProgress>>,
    pub(crate) poll_interval: Duration,
    pub(crate) max_slots: usize,
    pub(crate) rng: StdRng,
}

impl LoadPass {
    /// Polls until every slot and the stage are done, the pass fails, or
    /// it is cancelled.
    pub(crate) fn run(mut self) -> PassOutcome {
        let stopwatch = Stopwatch::new();
        let mut slots: [SlotProgress; MAX_SLOTS] = std::array::from_fn(|i| {
            if i < self.max_slots {
                SlotProgress::Pending
            } else {
                SlotProgress::Inactive
            }
        });
        let mut stage = None;
        log::info!("Load pass started for round {}.", self.plan.round_number);

        loop {
            if let Err(e) = self.poll_once(&mut slots, &mut stage) {
                return self.fail(e);
            }
            self.publish(&slots, stage.is_some());
            let slots_done = slots.iter().all(|s| !matches!(s, SlotProgress::Pending));
            if slots_done && stage.is_some() {
                break;
            }

            thread::sleep(self.poll_interval);
            if self.context.is_shutting_down() {
                self.state.transition(LoaderState::Loading, LoaderState::Cancelled);
            }
            if self.state.get() == LoaderState::Cancelled {
                log::info!("Load pass cancelled.");
                return PassOutcome::Cancelled;
            }
        }

        let Some(stage) = stage else {
            return PassOutcome::Cancelled;
        };
        let entities = slots.map(|s| match s {
            SlotProgress::Loaded(entity) => Some(entity),
            SlotProgress::Pending | SlotProgress::Inactive => None,
        });
        if !self.state.transition(LoaderState::Loading, LoaderState::Complete) {
            log::info!("Load pass cancelled.");
            return PassOutcome::Cancelled;
        }
        log::info!("Load pass complete in {} ms.", stopwatch.elapsed_ms());
        PassOutcome::Complete(MatchAssets { entities, stage })
    }

    fn fail(&self, error: LoadError) -> PassOutcome {
        if self.state.transition(LoaderState::Loading, LoaderState::Error) {
            log::error!("Load pass failed: {error}");
            PassOutcome::Failed(error)
        } else {
            PassOutcome::Cancelled
        }
    }

    fn publish(&self, slots: &[SlotProgress; MAX_SLOTS], stage_done: bool) {
        let mut progress = lock(&self.progress);
        for (done, slot) in progress.slots_done.iter_mut().zip(slots) {
            *done = !matches!(slot, SlotProgress::Pending);
        }
        progress.stage_done = stage_done;
    }

    fn poll_once(
        &mut self,
        slots: &mut [SlotProgress; MAX_SLOTS],
        stage: &mut Option<Arc<StageHandle>>,
    ) -> Result<(), LoadError> {
        let decode_context = Arc::clone(&self.backends.decode_context);
        let _binding = ContextBinding::new(decode_context.as_ref());

        for slot in SlotIndex::all() {
            if !matches!(slots[slot.index()], SlotProgress::Pending) {
                continue;
            }
            let needed = self
                .context
                .with_selection(|selection| requirement(slot, &self.plan, selection));
            match needed {
                SlotRequirement::Inactive => slots[slot.index()] = SlotProgress::Inactive,
                SlotRequirement::NotReady => {}
                SlotRequirement::Load {
                    entity,
                    palette,
                    roster,
                } => {
                    let loaded = self.load_slot(slot, entity, palette, &roster)?;
                    slots[slot.index()] = SlotProgress::Loaded(loaded);
                }
            }
        }

        for side in Side::BOTH {
            let first_follower = side.index() + 2;
            if !matches!(slots[first_follower], SlotProgress::Pending) {
                continue;
            }
            let retire = self
                .context
                .with_selection(|selection| retire_followers(side, &self.plan, selection));
            if retire {
                for index in (first_follower..MAX_SLOTS).step_by(2) {
                    slots[index] = SlotProgress::Inactive;
                }
            }
        }

        if stage.is_none() {
            *stage = self.load_stage()?;
        }
        Ok(())
    }

    fn load_slot(
        &self,
        slot: SlotIndex,
        entity: usize,
        selected_palette: u32,
        roster: &[usize],
    ) -> Result<Arc<LoadedEntity>, LoadError> {
        let catalog = self.context.catalog();
        let path = catalog
            .entity(entity)
            .ok_or(LoadError::Catalog {
                kind: "entity",
                index: entity,
            })?
            .definition
            .clone();
        let side = slot.side();

        let cached = lock(&self.cache).entity(slot, &path);
        let (definition, behavior) = match cached {
            Some(previous) => {
                log::debug!("{slot}: reusing '{}'.", path.display());
                (Arc::clone(&previous.definition), previous.behavior.clone())
            }
            None => {
                log::debug!("{slot}: loading '{}'.", path.display());
                let definition = Arc::new(self.backends.entities.decode(&path)?);
                let behavior = self.backends.compiler.compile(slot, &path)?;
                (definition, behavior)
            }
        };

        let kept_palette = if self.plan.rounds_played[side.index()] > 0 {
            lock(&self.cache).palette(slot)
        } else {
            None
        };
        let palette_no = kept_palette.unwrap_or_else(|| definition.resolve_palette(selected_palette));

        let face = match self
            .backends
            .entities
            .decode_portrait(&path, PortraitKind::Face, palette_no)
        {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("{slot}: no face portrait: {e}");
                None
            }
        };

        let teammates_shown =
            self.plan.teams[side.index()].mode == TeamMode::Turns && self.plan.round_number == 1;
        let teammate_faces = if teammates_shown {
            roster
                .iter()
                .map(|&member| self.teammate_face(member))
                .collect()
        } else {
            Vec::new()
        };

        let loaded = Arc::new(LoadedEntity {
            definition,
            behavior,
            palette_no,
            face,
            teammate_faces,
        });
        lock(&self.cache).store_entity(slot, Arc::clone(&loaded));
        Ok(loaded)
    }

    fn teammate_face(&self, member: usize) -> Option<versus_core::asset::Portrait> {
        let entry = self.context.catalog().entity(member)?;
        match self
            .backends
            .entities
            .decode_portrait(&entry.definition, PortraitKind::TeammateFace, 1)
        {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("No teammate portrait for '{}': {e}", entry.name);
                None
            }
        }
    }

    fn load_stage(&mut self) -> Result<Option<Arc<StageHandle>>, LoadError> {
        let catalog = self.context.catalog();
        let index = match self.context.with_selection(|selection| selection.stage()) {
            StageChoice::Unselected => return Ok(None),
            StageChoice::Random if catalog.stage_count() == 0 => {
                return Err(LoadError::Catalog {
                    kind: "stage",
                    index: 0,
                })
            }
            StageChoice::Random => self.rng.gen_range(0..catalog.stage_count()),
            StageChoice::Index(index) => index,
        };
        let entry = catalog.stage(index).ok_or(LoadError::Catalog {
            kind: "stage",
            index,
        })?;

        if let Some(stage) = lock(&self.cache).stage(&entry.definition) {
            log::debug!("Stage '{}' already loaded.", entry.name);
            return Ok(Some(stage));
        }
        log::info!("Loading stage '{}'.", entry.name);
        let stage = Arc::new(self.backends.stages.load(&entry.definition)?);
        lock(&self.cache).store_stage(Arc::clone(&stage));
        Ok(Some(stage))
    }
}
