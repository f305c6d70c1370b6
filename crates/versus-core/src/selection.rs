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

//! Catalog of available entities and stages, the per-side selections made
//! on the select screen, and the shared [`MatchContext`] that hands both to
//! the loader thread.

use crate::team::Side;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An entity available for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntity {
    /// Display name.
    pub name: String,
    /// Path of the entity definition file.
    pub definition: PathBuf,
}

/// A stage available for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStage {
    /// Display name.
    pub name: String,
    /// Path of the stage definition file.
    pub definition: PathBuf,
}

/// Everything that can be picked on the select screen.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<CatalogEntity>,
    stages: Vec<CatalogStage>,
}

impl Catalog {
    /// Builds a catalog from its entity and stage lists.
    pub fn new(entities: Vec<CatalogEntity>, stages: Vec<CatalogStage>) -> Self {
        Self { entities, stages }
    }

    /// Looks up an entity by catalog index.
    pub fn entity(&self, index: usize) -> Option<&CatalogEntity> {
        self.entities.get(index)
    }

    /// Looks up a stage by catalog index.
    pub fn stage(&self, index: usize) -> Option<&CatalogStage> {
        self.stages.get(index)
    }

    /// Number of selectable stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Number of selectable entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// One pick of a side's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    /// Catalog index of the entity.
    pub entity: usize,
    /// Palette chosen on the select screen, 1-based.
    pub palette: u32,
}

/// The stage picked for the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageChoice {
    /// Nothing picked yet; the loader keeps waiting.
    #[default]
    Unselected,
    /// Pick a random stage when loading starts.
    Random,
    /// A specific catalog stage.
    Index(usize),
}

/// Selections of both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rosters: [Vec<RosterEntry>; 2],
    stage: StageChoice,
}

impl Selection {
    /// Appends a pick to a side's roster.
    pub fn push(&mut self, side: Side, entry: RosterEntry) {
        self.rosters[side.index()].push(entry);
    }

    /// Picks of a side, in selection order.
    pub fn roster(&self, side: Side) -> &[RosterEntry] {
        &self.rosters[side.index()]
    }

    /// Current stage choice.
    pub fn stage(&self) -> StageChoice {
        self.stage
    }

    /// Replaces the stage choice.
    pub fn set_stage(&mut self, stage: StageChoice) {
        self.stage = stage;
    }

    /// Drops every pick and the stage choice.
    pub fn clear(&mut self) {
        self.rosters.iter_mut().for_each(Vec::clear);
        self.stage = StageChoice::Unselected;
    }
}

/// State shared between the match driver and the loader thread.
///
/// The selection sits behind a mutex because the select screen keeps
/// editing it while a load pass polls it. Readers copy what they need
/// and release the lock before doing any slow work.
#[derive(Debug)]
pub struct MatchContext {
    catalog: Arc<Catalog>,
    selection: Mutex<Selection>,
    shutdown: AtomicBool,
}

impl MatchContext {
    /// Creates a context over a catalog with an empty selection.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            selection: Mutex::new(Selection::default()),
            shutdown: AtomicBool::new(false),
        }
    }

    /// The catalog selections refer to.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Locks the selection. A poisoned lock is recovered since the
    /// selection holds plain data.
    pub fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with the selection locked and returns its result.
    pub fn with_selection<R>(&self, f: impl FnOnce(&Selection) -> R) -> R {
        f(&self.selection())
    }

    /// Adds a pick for `side`.
    pub fn select_entity(&self, side: Side, entry: RosterEntry) {
        self.selection().push(side, entry);
    }

    /// Sets the stage choice.
    pub fn select_stage(&self, stage: StageChoice) {
        self.selection().set_stage(stage);
    }

    /// Clears every pick.
    pub fn clear_selection(&self) {
        self.selection().clear();
    }

    /// Asks every background worker to stop as soon as possible.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// `true` once a shutdown was requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
