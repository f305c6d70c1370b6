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

//! Sides, team modes and the fixed slot layout shared by every subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of members a side can field at once.
pub const MAX_SIMUL: usize = 4;

/// Total number of combatant slots. Slots alternate sides: even slots
/// belong to [`Side::One`], odd slots to [`Side::Two`].
pub const MAX_SLOTS: usize = MAX_SIMUL * 2;

/// One of the two opposing sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The left side, owning even slots.
    One,
    /// The right side, owning odd slots.
    Two,
}

impl Side {
    /// Both sides, in slot order.
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    /// Returns the array index used for per-side tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    /// Returns the opposing side.
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => write!(f, "side 1"),
            Side::Two => write!(f, "side 2"),
        }
    }
}

/// How a side fields its roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMode {
    /// One combatant per side.
    #[default]
    Single,
    /// Several members fight at the same time.
    Simultaneous,
    /// Members fight one after another; a new member enters after each loss.
    Turns,
}

/// Per-side team setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfiguration {
    /// How the roster is fielded.
    pub mode: TeamMode,
    /// Roster size: simultaneous members or turns members depending on `mode`.
    pub roster_size: u32,
    /// Round wins needed to take the match.
    pub match_wins_required: u32,
}

impl Default for TeamConfiguration {
    fn default() -> Self {
        Self {
            mode: TeamMode::Single,
            roster_size: 2,
            match_wins_required: 2,
        }
    }
}

impl TeamConfiguration {
    /// Number of members actually on the field at the same time.
    pub fn members_on_field(&self) -> usize {
        match self.mode {
            TeamMode::Simultaneous => (self.roster_size as usize).clamp(1, MAX_SIMUL),
            TeamMode::Single | TeamMode::Turns => 1,
        }
    }
}

/// Index of a combatant slot in `0..MAX_SLOTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Creates a slot index, or `None` when out of range.
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_SLOTS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// The leader slot of `side` (slot 0 or 1).
    pub const fn leader(side: Side) -> Self {
        Self(side.index() as u8)
    }

    /// Raw slot number.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Side owning this slot.
    #[inline]
    pub const fn side(self) -> Side {
        if self.0 & 1 == 0 {
            Side::One
        } else {
            Side::Two
        }
    }

    /// Position of this slot within its side (0 for the leader).
    #[inline]
    pub const fn member(self) -> usize {
        (self.0 >> 1) as usize
    }

    /// Iterates all slots in order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..MAX_SLOTS as u8).map(SlotIndex)
    }

    /// Iterates the slots of one side, leader first.
    pub fn of_side(side: Side) -> impl Iterator<Item = SlotIndex> {
        (side.index() as u8..MAX_SLOTS as u8).step_by(2).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}
