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

//! The rollback point a round reset rewinds to.

use versus_control::round::Score;
use versus_control::RoundController;
use versus_core::entity::{EntityLifeSnapshot, Roster};
use versus_core::team::{SlotIndex, MAX_SLOTS};

/// Life, power and variable banks of every combatant plus the score, as
/// they were when the round started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSnapshot {
    entities: [Option<EntityLifeSnapshot>; MAX_SLOTS],
    score: Score,
}

impl RoundSnapshot {
    /// Captures the current state of `roster` and the score of `round`.
    pub fn capture(roster: &Roster, round: &RoundController) -> Self {
        let entities = std::array::from_fn(|i| {
            SlotIndex::new(i)
                .and_then(|slot| roster.get(slot))
                .map(|combatant| combatant.capture())
        });
        Self {
            entities,
            score: round.score(),
        }
    }

    /// Rewinds `roster` and the score of `round` to the captured state.
    ///
    /// Combatants that joined after the capture are left untouched.
    pub fn restore(&self, roster: &mut Roster, round: &mut RoundController) {
        round.restore_score(self.score);
        for combatant in roster.iter_mut() {
            if let Some(snapshot) = &self.entities[combatant.slot().index()] {
                combatant.restore(snapshot);
            }
        }
    }

    /// Captured state of one slot.
    pub fn entity(&self, slot: SlotIndex) -> Option<&EntityLifeSnapshot> {
        self.entities[slot.index()].as_ref()
    }

    /// Captured score.
    pub fn score(&self) -> Score {
        self.score
    }
}
