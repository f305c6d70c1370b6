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

use std::path::Path;
use std::sync::Arc;
use versus_core::asset::{LoadedEntity, StageHandle};
use versus_core::team::{SlotIndex, MAX_SLOTS};

/// Assets kept across passes so unchanged picks are not loaded twice.
#[derive(Debug, Default)]
pub(crate) struct AssetCache {
    entities: [Option<Arc<LoadedEntity>>; MAX_SLOTS],
    palettes: [Option<u32>; MAX_SLOTS],
    stage: Option<Arc<StageHandle>>,
}

impl AssetCache {
    /// The entity last loaded into `slot`, if it came from `definition`.
    pub(crate) fn entity(&self, slot: SlotIndex, definition: &Path) -> Option<Arc<LoadedEntity>> {
        self.entities[slot.index()]
            .as_ref()
            .filter(|entity| entity.definition.definition == definition)
            .cloned()
    }

    pub(crate) fn store_entity(&mut self, slot: SlotIndex, entity: Arc<LoadedEntity>) {
        self.palettes[slot.index()] = Some(entity.palette_no);
        self.entities[slot.index()] = Some(entity);
    }

    /// Palette kept for `slot` from an earlier pass of the match.
    pub(crate) fn palette(&self, slot: SlotIndex) -> Option<u32> {
        self.palettes[slot.index()]
    }

    /// The loaded stage, if it came from `definition`.
    pub(crate) fn stage(&self, definition: &Path) -> Option<Arc<StageHandle>> {
        self.stage
            .as_ref()
            .filter(|stage| stage.definition == definition)
            .cloned()
    }

    pub(crate) fn store_stage(&mut self, stage: Arc<StageHandle>) {
        self.stage = Some(stage);
    }
}
