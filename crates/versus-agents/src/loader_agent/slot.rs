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

use versus_core::selection::Selection;
use versus_core::team::{Side, SlotIndex, TeamConfiguration, TeamMode};

/// What a load pass is preparing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    /// Team setup of both sides.
    pub teams: [TeamConfiguration; 2],
    /// Rounds won so far; picks the next turns member.
    pub match_wins: [u32; 2],
    /// Rounds each side has played in the current match.
    pub rounds_played: [u32; 2],
    /// Round the assets are for.
    pub round_number: u32,
}

impl LoadPlan {
    /// Plan for the first round of a fresh match.
    pub fn new_match(teams: [TeamConfiguration; 2]) -> Self {
        Self {
            teams,
            match_wins: [0; 2],
            rounds_played: [0; 2],
            round_number: 1,
        }
    }
}

/// What a slot needs this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotRequirement {
    /// Nobody plays in this slot.
    Inactive,
    /// The pick is not known yet; retry on the next poll.
    NotReady,
    /// Load this pick.
    Load {
        /// Catalog index of the entity.
        entity: usize,
        /// Palette picked on the select screen.
        palette: u32,
        /// Catalog indices of the side's whole roster, for turns portraits.
        roster: Vec<usize>,
    },
}

/// Decides what `slot` needs from the current selection.
pub(crate) fn requirement(slot: SlotIndex, plan: &LoadPlan, selection: &Selection) -> SlotRequirement {
    let side = slot.side();
    let team = plan.teams[side.index()];
    let picks = selection.roster(side);

    match team.mode {
        TeamMode::Simultaneous if slot.member() >= team.roster_size as usize => {
            return SlotRequirement::Inactive;
        }
        // Non-leader slots of single and turns sides are retired by
        // `retire_followers` once the side has a pick.
        TeamMode::Single | TeamMode::Turns if slot.member() >= 1 => return SlotRequirement::NotReady,
        _ => {}
    }
    if team.mode == TeamMode::Turns && picks.len() < team.roster_size as usize {
        return SlotRequirement::NotReady;
    }
    let member = match team.mode {
        TeamMode::Turns => plan.match_wins[side.opponent().index()] as usize,
        _ => slot.member(),
    };
    match picks.get(member) {
        Some(pick) => SlotRequirement::Load {
            entity: pick.entity,
            palette: pick.palette,
            roster: picks.iter().map(|p| p.entity).collect(),
        },
        None => SlotRequirement::NotReady,
    }
}

/// `true` when the non-leader slots of `side` will never be used.
pub(crate) fn retire_followers(side: Side, plan: &LoadPlan, selection: &Selection) -> bool {
    !selection.roster(side).is_empty() && plan.teams[side.index()].mode != TeamMode::Simultaneous
}
