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

//! The per-slot combatant model: decoded definitions, the mutable fight
//! state of each slot, and the snapshots used to rewind a round.

use crate::team::{Side, SlotIndex, MAX_SLOTS};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Number of palettes an entity can expose on the select screen.
pub const MAX_PALETTES: usize = 12;

/// Static data decoded from an entity definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    /// Display name.
    pub name: String,
    /// Path of the definition file; identifies the entity for reuse checks.
    pub definition: PathBuf,
    /// Base life pool.
    pub life: i32,
    /// Base power gauge capacity.
    pub power: i32,
    /// Number of integer variables.
    pub int_var_count: usize,
    /// Number of float variables.
    pub float_var_count: usize,
    /// Integer variables below this index are cleared every round.
    pub int_persist_index: usize,
    /// Float variables below this index are cleared every round.
    pub float_persist_index: usize,
    /// Maps a select-screen palette (1-based) to the palette actually used
    /// (0-based). Empty means identity.
    pub palette_keymap: Vec<u32>,
}

impl EntityDefinition {
    /// Creates a definition with the usual variable bank sizes.
    pub fn new(name: impl Into<String>, definition: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
            life: 1000,
            power: 3000,
            int_var_count: 60,
            float_var_count: 40,
            int_persist_index: 60,
            float_persist_index: 40,
            palette_keymap: Vec::new(),
        }
    }

    /// Resolves a select-screen palette number to the palette the entity
    /// is drawn with (both 1-based).
    pub fn resolve_palette(&self, selected: u32) -> u32 {
        let index = selected.saturating_sub(1) as usize;
        match self.palette_keymap.get(index) {
            Some(mapped) => mapped + 1,
            None => selected.max(1),
        }
    }
}

/// Palette substitutions applied on top of the selected palette.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteRemap {
    entries: BTreeMap<u32, u32>,
}

impl PaletteRemap {
    /// Draws palette `from` with palette `to`.
    pub fn remap(&mut self, from: u32, to: u32) {
        if from == to {
            self.entries.remove(&from);
        } else {
            self.entries.insert(from, to);
        }
    }

    /// Palette actually used when `palette` is requested.
    pub fn resolve(&self, palette: u32) -> u32 {
        self.entries.get(&palette).copied().unwrap_or(palette)
    }

    /// `true` when nothing is remapped.
    pub fn is_identity(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every substitution.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

/// Life, power and variable banks of one combatant, enough to rewind it
/// to the start of a round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityLifeSnapshot {
    /// Current life.
    pub life: i32,
    /// Life capacity.
    pub life_max: i32,
    /// Current power.
    pub power: i32,
    /// Integer variable bank.
    pub int_vars: Vec<i32>,
    /// Float variable bank.
    pub float_vars: Vec<f32>,
}

/// A combatant occupying one slot for the duration of a match.
#[derive(Debug, Clone)]
pub struct Combatant {
    slot: SlotIndex,
    definition: Arc<EntityDefinition>,
    /// Runtime id; helpers spawned by the world are numbered after these.
    pub id: i32,
    /// Palette the combatant is drawn with, 1-based.
    pub palette_no: u32,
    /// Current life.
    pub life: i32,
    /// Life capacity after handicaps.
    pub life_max: i32,
    /// Current power.
    pub power: i32,
    /// Power capacity, possibly shared with teammates.
    pub power_max: i32,
    /// Integer variable bank.
    pub int_vars: Vec<i32>,
    /// Float variable bank.
    pub float_vars: Vec<f32>,
    /// Palette substitutions requested by the entity's behavior.
    pub palette_remap: PaletteRemap,
    /// Whether the combatant accepts player control.
    pub ctrl: bool,
}

impl Combatant {
    /// Creates a fresh combatant at full life.
    pub fn new(slot: SlotIndex, definition: Arc<EntityDefinition>, palette_no: u32) -> Self {
        Self {
            slot,
            id: slot.index() as i32,
            palette_no,
            life: definition.life,
            life_max: definition.life,
            power: 0,
            power_max: definition.power,
            int_vars: vec![0; definition.int_var_count],
            float_vars: vec![0.0; definition.float_var_count],
            palette_remap: PaletteRemap::default(),
            ctrl: false,
            definition,
        }
    }

    /// Slot the combatant occupies.
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Side the combatant fights for.
    pub fn side(&self) -> Side {
        self.slot.side()
    }

    /// Decoded definition.
    pub fn definition(&self) -> &Arc<EntityDefinition> {
        &self.definition
    }

    /// `true` once life is depleted.
    pub fn is_knocked_out(&self) -> bool {
        self.life <= 0
    }

    /// Remaining life as a fraction of capacity.
    pub fn life_ratio(&self) -> f32 {
        if self.life_max <= 0 {
            return 0.0;
        }
        self.life.max(0) as f32 / self.life_max as f32
    }

    /// Puts the combatant back into its between-rounds state.
    ///
    /// Removes control, clears non-persistent variables and, when
    /// `reset_palette` is set, drops palette substitutions.
    pub fn prepare_round(&mut self, reset_palette: bool) {
        self.ctrl = false;
        let int_end = self.definition.int_persist_index.min(self.int_vars.len());
        self.int_vars[..int_end].fill(0);
        let float_end = self.definition.float_persist_index.min(self.float_vars.len());
        self.float_vars[..float_end].fill(0.0);
        if reset_palette {
            self.palette_remap.reset();
        }
    }

    /// Captures the state a round reset rewinds to.
    pub fn capture(&self) -> EntityLifeSnapshot {
        EntityLifeSnapshot {
            life: self.life,
            life_max: self.life_max,
            power: self.power,
            int_vars: self.int_vars.clone(),
            float_vars: self.float_vars.clone(),
        }
    }

    /// Rewinds to a captured state.
    pub fn restore(&mut self, snapshot: &EntityLifeSnapshot) {
        self.life = snapshot.life;
        self.life_max = snapshot.life_max;
        self.power = snapshot.power;
        self.int_vars.clone_from(&snapshot.int_vars);
        self.float_vars.clone_from(&snapshot.float_vars);
    }
}

/// The combatants of every slot. Empty slots are inactive for the match.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    slots: [Option<Combatant>; MAX_SLOTS],
}

impl Roster {
    /// Places a combatant in its slot, returning the previous occupant.
    pub fn insert(&mut self, combatant: Combatant) -> Option<Combatant> {
        let index = combatant.slot().index();
        self.slots[index].replace(combatant)
    }

    /// Empties a slot.
    pub fn remove(&mut self, slot: SlotIndex) -> Option<Combatant> {
        self.slots[slot.index()].take()
    }

    /// Combatant in a slot, if any.
    pub fn get(&self, slot: SlotIndex) -> Option<&Combatant> {
        self.slots[slot.index()].as_ref()
    }

    /// Mutable combatant in a slot, if any.
    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut Combatant> {
        self.slots[slot.index()].as_mut()
    }

    /// `true` when the slot holds a combatant.
    pub fn is_active(&self, slot: SlotIndex) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Active combatants in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.slots.iter().flatten()
    }

    /// Mutable active combatants in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.slots.iter_mut().flatten()
    }

    /// Active combatants of one side.
    pub fn side(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.iter().filter(move |c| c.side() == side)
    }

    /// `true` when the side fields someone and every one of them is down.
    pub fn side_knocked_out(&self, side: Side) -> bool {
        let mut members = self.side(side).peekable();
        members.peek().is_some() && members.all(Combatant::is_knocked_out)
    }

    /// Summed life ratio of a side, used to judge a time over.
    pub fn side_life_ratio(&self, side: Side) -> f32 {
        self.side(side).map(Combatant::life_ratio).sum()
    }
}
