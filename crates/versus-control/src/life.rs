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

//! Life pool scaling between mismatched teams and handicap levels, and the
//! life bookkeeping of round and match transitions.

use crate::round::RoundController;
use versus_core::config::LifeRules;
use versus_core::entity::Roster;
use versus_core::team::{Side, SlotIndex, TeamConfiguration, TeamMode, MAX_SLOTS};

/// Life multiplier for a handicap level: twelve levels per doubling.
/// Whole octaves stay exact.
pub fn level_power(level: i32) -> f64 {
    2f64.powf(f64::from(level) / 12.0)
}

/// Multiplier applied to the base life of a member of `own` facing `other`.
pub fn cross_mode_factor(own: &TeamConfiguration, other: &TeamConfiguration, team_1vs2_life: f32) -> f32 {
    let own_simul = own.roster_size.max(1) as f32;
    let other_count = other.roster_size as f32;
    match (own.mode, other.mode) {
        (TeamMode::Single, TeamMode::Simultaneous) => team_1vs2_life,
        (TeamMode::Single, TeamMode::Turns) => {
            if other.roster_size < other.match_wins_required {
                other_count / other.match_wins_required as f32
            } else {
                1.0
            }
        }
        (TeamMode::Simultaneous, TeamMode::Simultaneous) => {
            if other.roster_size < own.roster_size {
                other_count / own_simul
            } else {
                1.0
            }
        }
        (TeamMode::Simultaneous, TeamMode::Turns) => {
            let divisor = own.roster_size * other.match_wins_required;
            if other.roster_size < divisor {
                other_count / divisor as f32
            } else {
                1.0
            }
        }
        (TeamMode::Simultaneous, TeamMode::Single) => 1.0 / own_simul,
        (TeamMode::Turns, TeamMode::Single) => {
            if own.match_wins_required < own.roster_size {
                own.match_wins_required as f32 / own.roster_size as f32
            } else {
                1.0
            }
        }
        (TeamMode::Turns, TeamMode::Simultaneous) => {
            let numerator = other.roster_size * own.match_wins_required;
            if numerator < own.roster_size {
                team_1vs2_life * numerator as f32 / own.roster_size as f32
            } else {
                1.0
            }
        }
        (TeamMode::Turns, TeamMode::Turns) => {
            if other.roster_size < own.roster_size {
                other_count / own.roster_size as f32
            } else {
                1.0
            }
        }
        (TeamMode::Single, TeamMode::Single) => 1.0,
    }
}

/// Shifts levels so the extreme of the active slots sits at zero: the
/// minimum when every level is positive, the maximum when every level is
/// negative.
pub fn normalize_levels(levels: &mut [i32; MAX_SLOTS], roster: &Roster) {
    let active = SlotIndex::all()
        .filter(|slot| roster.is_active(*slot))
        .map(|slot| levels[slot.index()]);
    let (min, max) = active.fold((i32::MAX, i32::MIN), |(lo, hi), lv| (lo.min(lv), hi.max(lv)));
    if min == i32::MAX {
        return;
    }
    let shift = if min > 0 {
        min
    } else if max < 0 {
        max
    } else {
        0
    };
    levels.iter_mut().for_each(|lv| *lv -= shift);
}

/// What follows a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTransition {
    /// Another round of the same fight.
    NextRound,
    /// The fight is over: the match is decided, or a turns side needs its
    /// next member loaded.
    FightOver,
}

/// Scales life pools for one fight.
#[derive(Debug, Clone)]
pub struct LifeScaler {
    rules: LifeRules,
    teams: [TeamConfiguration; 2],
    levels: [i32; MAX_SLOTS],
}

impl LifeScaler {
    /// Builds a scaler from raw handicap levels, normalized over the
    /// active slots of `roster`.
    pub fn new(
        rules: LifeRules,
        teams: [TeamConfiguration; 2],
        mut levels: [i32; MAX_SLOTS],
        roster: &Roster,
    ) -> Self {
        normalize_levels(&mut levels, roster);
        Self {
            rules,
            teams,
            levels,
        }
    }

    /// Normalized handicap level of a slot.
    pub fn level(&self, slot: SlotIndex) -> i32 {
        self.levels[slot.index()]
    }

    fn level_factor(&self, slot: SlotIndex) -> f64 {
        level_power(-self.level(slot))
    }

    /// Life capacity of a slot whose entity has `base_life`.
    pub fn life_max(&self, slot: SlotIndex, base_life: i32) -> i32 {
        let side = slot.side();
        let mut life = base_life as f32 * self.rules.life_mul;
        life *= cross_mode_factor(
            &self.teams[side.index()],
            &self.teams[side.opponent().index()],
            self.rules.team_1vs2_life,
        );
        ((self.level_factor(slot) * f64::from(life)).floor() as i32).max(1)
    }

    /// Applies life capacities at the start of a fight.
    ///
    /// A side that already played keeps its damage, rescaled to the new
    /// capacity. Otherwise life refills on the first round or for a fresh
    /// turns member, and power empties on the first round.
    pub fn apply(&self, roster: &mut Roster, round_number: u32, rounds_played: [u32; 2]) {
        for combatant in roster.iter_mut() {
            let slot = combatant.slot();
            let side = slot.side();
            let factor = self.level_factor(slot);
            combatant.life_max = self.life_max(slot, combatant.definition().life);
            if rounds_played[side.index()] > 0 {
                let rescaled = (factor * f64::from(combatant.life)).ceil() as i32;
                combatant.life = combatant.life_max.min(rescaled);
            } else if round_number == 1 || self.teams[side.index()].mode == TeamMode::Turns {
                combatant.life = combatant.life_max;
                if round_number == 1 {
                    combatant.power = 0;
                }
            }
        }
    }

    /// Advances the match past a round that is over and fixes up life.
    ///
    /// When the fight continues, every combatant refills except turns
    /// members that won, who keep their life with at least one point.
    /// Otherwise each side's survivors get the win-streak bonus, fresh
    /// members of a side that did not lose refill, and losing turns
    /// leaders are emptied.
    pub fn finish_round(&self, round: &mut RoundController, roster: &mut Roster) -> RoundTransition {
        round.advance_round();
        let turns_leader_standing = |side: Side| {
            round.teams()[side.index()].mode != TeamMode::Turns || round.is_winner(side)
        };
        let continues = !round.match_over() && Side::BOTH.into_iter().all(turns_leader_standing);

        if continues {
            for combatant in roster.iter_mut() {
                let side = combatant.side();
                if round.teams()[side.index()].mode != TeamMode::Turns || !round.is_winner(side) {
                    combatant.life = combatant.life_max;
                } else if combatant.life <= 0 {
                    combatant.life = 1;
                }
            }
            return RoundTransition::NextRound;
        }

        for side in Side::BOTH {
            let mode = round.teams()[side.index()].mode;
            if round.is_winner(side) || (!round.is_loser(side) && mode != TeamMode::Turns) {
                let bonus = level_power(self.level(SlotIndex::leader(side)));
                for slot in SlotIndex::of_side(side) {
                    let Some(combatant) = roster.get_mut(slot) else {
                        continue;
                    };
                    combatant.life = if round.is_winner(side) {
                        ((bonus * f64::from(combatant.life)).ceil() as i32).max(1)
                    } else {
                        combatant.definition().life.max(1)
                    };
                }
            } else if let Some(leader) = roster.get_mut(SlotIndex::leader(side)) {
                leader.life = 0;
            }
        }
        if round.match_over() {
            log::info!(
                "Match over after {} rounds, wins {:?}, draws {}.",
                round.round_number() - 1,
                round.match_wins(),
                round.draws()
            );
        }
        RoundTransition::FightOver
    }
}

/// Gives every member of a sharing side the larger of the leader's and its
/// own base power as capacity.
pub fn apply_power_share(roster: &mut Roster, share: [bool; 2]) {
    for side in Side::BOTH {
        if !share[side.index()] {
            continue;
        }
        let Some(leader_power) = roster
            .get(SlotIndex::leader(side))
            .map(|c| c.definition().power)
        else {
            continue;
        };
        for combatant in roster.iter_mut().filter(|c| c.side() == side) {
            combatant.power_max = leader_power.max(combatant.definition().power);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(mode: TeamMode, roster_size: u32, wins: u32) -> TeamConfiguration {
        TeamConfiguration {
            mode,
            roster_size,
            match_wins_required: wins,
        }
    }

    #[test]
    fn test_single_vs_simultaneous_uses_team_constant() {
        let own = team(TeamMode::Single, 1, 2);
        let other = team(TeamMode::Simultaneous, 2, 2);
        assert_eq!(cross_mode_factor(&own, &other, 1.5), 1.5);
    }

    #[test]
    fn test_simultaneous_divides_against_single() {
        let own = team(TeamMode::Simultaneous, 2, 2);
        let other = team(TeamMode::Single, 1, 2);
        assert_eq!(cross_mode_factor(&own, &other, 1.5), 0.5);
    }

    #[test]
    fn test_turns_factors_only_shrink() {
        let turns = team(TeamMode::Turns, 3, 2);
        let single = team(TeamMode::Single, 1, 2);
        assert!((cross_mode_factor(&turns, &single, 1.0) - 2.0 / 3.0).abs() < 1e-6);

        let short_turns = team(TeamMode::Turns, 1, 2);
        assert!((cross_mode_factor(&single, &short_turns, 1.0) - 0.5).abs() < 1e-6);
        let long_turns = team(TeamMode::Turns, 4, 2);
        assert_eq!(cross_mode_factor(&single, &long_turns, 1.0), 1.0);
    }
}
