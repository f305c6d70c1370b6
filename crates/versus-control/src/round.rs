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

//! The round and match state machine.
//!
//! The phase of a round is never stored. It is derived from the intro
//! countdown: positive while the intro plays, zero during the fight, and
//! negative once the round is decided, counting down through the hit,
//! wait and win windows until the round is over.

use crate::freeze::FreezeWindows;
use versus_core::config::RoundRules;
use versus_core::entity::Roster;
use versus_core::team::{Side, TeamConfiguration};
use versus_core::world::{FreezeView, SpecialFlags, StepReport};

/// Sub-phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Intro countdown running; nobody has control yet.
    Intro,
    /// The fight is on.
    Fight,
    /// The round is decided.
    PostRound,
}

/// How a round was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishKind {
    /// Still undecided.
    #[default]
    NotYet,
    /// A side was knocked out.
    Normal,
    /// A side was knocked out by a finishing move.
    Special,
    /// The round timer ran out.
    TimeOver,
    /// Nobody won the round.
    Draw,
}

/// Notable transitions reported by [`RoundController::end_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Players gained control.
    FightStarted,
    /// The round was decided.
    Finished {
        /// Winning side, `None` for a draw.
        winner: Option<Side>,
        /// How it ended.
        kind: FinishKind,
    },
}

/// Score of a match, restored when a round is rewound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    /// Rounds won by each side.
    pub match_wins: [u32; 2],
    /// Rounds drawn.
    pub draws: u32,
}

/// Owns the round counters and decides when rounds and matches end.
#[derive(Debug, Clone)]
pub struct RoundController {
    rules: RoundRules,
    teams: [TeamConfiguration; 2],
    round_number: u32,
    score: Score,
    rounds_played: [u32; 2],
    intro_countdown: i32,
    round_timer: Option<u32>,
    freeze: FreezeWindows,
    special_flags: SpecialFlags,
    winner: Option<Side>,
    finish: FinishKind,
    special_finish: bool,
    waitdown: i32,
    shutter_time: i32,
    win_skipped: bool,
    next_entity_id: i32,
}

impl RoundController {
    /// Creates a controller at the start of a match.
    pub fn new(rules: RoundRules, teams: [TeamConfiguration; 2]) -> Self {
        Self {
            rules,
            teams,
            round_number: 1,
            score: Score::default(),
            rounds_played: [0; 2],
            intro_countdown: intro_length(&rules),
            round_timer: rules.round_time,
            freeze: FreezeWindows::default(),
            special_flags: SpecialFlags::EMPTY,
            winner: None,
            finish: FinishKind::NotYet,
            special_finish: false,
            waitdown: 0,
            shutter_time: 0,
            win_skipped: false,
            next_entity_id: rules.helper_max,
        }
    }

    /// Starts a new match with fresh counters.
    pub fn reset_match(&mut self) {
        *self = Self::new(self.rules, self.teams);
    }

    /// Replaces the team setup. Takes effect for the life scaling of the
    /// next match.
    pub fn set_teams(&mut self, teams: [TeamConfiguration; 2]) {
        self.teams = teams;
    }

    /// Round timings in use.
    pub fn rules(&self) -> &RoundRules {
        &self.rules
    }

    /// Team setup of both sides.
    pub fn teams(&self) -> &[TeamConfiguration; 2] {
        &self.teams
    }

    /// Current round, starting at 1.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Rounds won by each side.
    pub fn match_wins(&self) -> [u32; 2] {
        self.score.match_wins
    }

    /// Rounds drawn.
    pub fn draws(&self) -> u32 {
        self.score.draws
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Rewinds the score, used when a round is reset.
    pub fn restore_score(&mut self, score: Score) {
        self.score = score;
    }

    /// Rounds each side has completed in this match.
    pub fn rounds_played(&self) -> [u32; 2] {
        self.rounds_played
    }

    /// Signed intro countdown the phase is derived from.
    pub fn intro_countdown(&self) -> i32 {
        self.intro_countdown
    }

    /// Overrides the intro countdown.
    pub fn set_intro_countdown(&mut self, value: i32) {
        self.intro_countdown = value;
    }

    /// Ticks left on the round timer, `None` when untimed.
    pub fn round_timer(&self) -> Option<u32> {
        self.round_timer
    }

    /// Winner of the current round, if decided.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// How the current round was decided.
    pub fn finish(&self) -> FinishKind {
        self.finish
    }

    /// Pause windows of the round.
    pub fn freeze(&self) -> &FreezeWindows {
        &self.freeze
    }

    /// Mutable pause windows of the round.
    pub fn freeze_mut(&mut self) -> &mut FreezeWindows {
        &mut self.freeze
    }

    /// Global conditions asserted for the current tick.
    pub fn special_flags(&self) -> SpecialFlags {
        self.special_flags
    }

    /// `true` once the post-round wait was shortened by input.
    pub fn win_skipped(&self) -> bool {
        self.win_skipped
    }

    /// Remaining grace ticks of the post-round sequence.
    pub fn waitdown(&self) -> i32 {
        self.waitdown
    }

    /// Ticks spent on the closing shutter after the round is over.
    pub fn shutter_time(&self) -> i32 {
        self.shutter_time
    }

    /// Hands out a runtime id for an entity spawned during the round.
    pub fn allocate_entity_id(&mut self) -> i32 {
        self.next_entity_id += 1;
        self.next_entity_id - 1
    }

    /// `true` when `side` won the current round.
    pub fn is_winner(&self, side: Side) -> bool {
        self.winner == Some(side)
    }

    /// `true` when `side` lost the current round.
    pub fn is_loser(&self, side: Side) -> bool {
        self.winner == Some(side.opponent())
    }

    /// Phase derived from the intro countdown.
    pub fn phase(&self) -> RoundPhase {
        match self.intro_countdown {
            n if n > 0 => RoundPhase::Intro,
            0 => RoundPhase::Fight,
            _ => RoundPhase::PostRound,
        }
    }

    /// `true` once the hit window after the finish has elapsed.
    pub fn round_end(&self) -> bool {
        self.intro_countdown < -self.rules.hit_stun_time
    }

    fn over_threshold(&self) -> i32 {
        -(self
            .rules
            .hit_stun_time
            .saturating_add(self.rules.wait_time)
            .saturating_add(self.rules.win_time))
    }

    /// `true` once the whole post-round sequence has elapsed.
    pub fn round_over_reached(&self) -> bool {
        self.intro_countdown < self.over_threshold()
    }

    /// Applies the post-round skip-ahead, then tests for round over.
    ///
    /// Between round end and round over, a button press on a tick frame
    /// jumps the countdown forward. The jump never lengthens the wait.
    pub fn round_over(&mut self, tick_frame: bool, any_button: bool) -> bool {
        if self.round_end() && !self.round_over_reached() && tick_frame && any_button {
            let skip_to = self.over_threshold().saturating_add(self.rules.start_wait_time);
            if skip_to < self.intro_countdown {
                log::debug!("Post-round wait skipped at countdown {}.", self.intro_countdown);
            }
            self.intro_countdown = self.intro_countdown.min(skip_to);
            self.win_skipped = true;
        }
        self.round_over_reached()
    }

    /// `true` once a side reached its required wins, or the draw limit hit.
    pub fn match_over(&self) -> bool {
        let won = Side::BOTH
            .iter()
            .any(|side| self.score.match_wins[side.index()] >= self.teams[side.index()].match_wins_required);
        let drawn_out = self
            .rules
            .max_draw_games
            .is_some_and(|limit| self.score.draws >= limit);
        won || drawn_out
    }

    /// Sets up the next round: clears effects and freezes, restarts the
    /// countdowns, and puts every combatant in its between-rounds state.
    ///
    /// Palette remaps only reset on a side's first round of the match.
    pub fn begin_round(&mut self, roster: &mut Roster) {
        self.freeze.clear();
        self.special_flags.clear();
        self.finish = FinishKind::NotYet;
        self.winner = None;
        self.special_finish = false;
        self.waitdown = self
            .rules
            .hit_stun_time
            .saturating_mul(self.rules.wait_time)
            .saturating_add(900);
        self.shutter_time = 0;
        self.win_skipped = false;
        self.intro_countdown = intro_length(&self.rules);
        self.round_timer = self.rules.round_time;
        self.next_entity_id = self.rules.helper_max;
        for combatant in roster.iter_mut() {
            self.next_entity_id = self.next_entity_id.max(combatant.id + 1);
            let first_round = self.rounds_played[combatant.side().index()] == 0;
            combatant.prepare_round(first_round);
        }
        log::info!("Round {} begins.", self.round_number);
    }

    /// Opens a logical tick: advances the freeze windows and drops the
    /// special flags that do not outlive it.
    pub fn begin_tick(&mut self) -> FreezeView {
        self.freeze.step();
        if self.freeze.any_active() {
            self.special_flags.remove(SpecialFlags::ROUND_NOT_OVER);
        } else {
            self.special_flags.clear();
        }
        self.freeze.view()
    }

    /// Takes in what the world raised while simulating the tick.
    pub fn absorb(&mut self, report: &StepReport) {
        self.special_flags.insert(report.special_flags);
        self.special_finish |= report.special_finish;
        for request in &report.freeze_requests {
            self.freeze.request(request);
        }
    }

    /// Closes a logical tick: runs the countdowns and decides the round.
    ///
    /// Nothing counts down while a freeze window is active.
    pub fn end_tick(&mut self, roster: &mut Roster) -> Option<RoundEvent> {
        if self.freeze.any_active() {
            return None;
        }
        match self.phase() {
            RoundPhase::Intro => {
                self.intro_countdown -= 1;
                if self.intro_countdown == 0 {
                    roster.iter_mut().for_each(|c| c.ctrl = true);
                    log::debug!("Round {}: fight.", self.round_number);
                    return Some(RoundEvent::FightStarted);
                }
                None
            }
            RoundPhase::Fight => {
                if let Some((winner, kind)) = self.decide(roster) {
                    self.record_finish(winner, kind);
                    self.intro_countdown -= 1;
                    return Some(RoundEvent::Finished { winner, kind });
                }
                None
            }
            RoundPhase::PostRound => {
                self.intro_countdown -= 1;
                if self.round_end() && self.waitdown > 0 {
                    self.waitdown -= 1;
                }
                if self.round_over_reached() {
                    self.shutter_time += 1;
                }
                None
            }
        }
    }

    fn decide(&mut self, roster: &Roster) -> Option<(Option<Side>, FinishKind)> {
        if self.special_flags.contains(SpecialFlags::ROUND_NOT_OVER) {
            return None;
        }
        let knocked_out = [
            roster.side_knocked_out(Side::One),
            roster.side_knocked_out(Side::Two),
        ];
        let ko_kind = if self.special_finish {
            FinishKind::Special
        } else {
            FinishKind::Normal
        };
        match knocked_out {
            [true, true] => return Some((None, FinishKind::Draw)),
            [true, false] => return Some((Some(Side::Two), ko_kind)),
            [false, true] => return Some((Some(Side::One), ko_kind)),
            [false, false] => {}
        }

        if self.special_flags.contains(SpecialFlags::TIMER_FREEZE) {
            return None;
        }
        let timer = self.round_timer.as_mut()?;
        *timer = timer.saturating_sub(1);
        if *timer > 0 {
            return None;
        }
        let one = roster.side_life_ratio(Side::One);
        let two = roster.side_life_ratio(Side::Two);
        Some(if one > two {
            (Some(Side::One), FinishKind::TimeOver)
        } else if two > one {
            (Some(Side::Two), FinishKind::TimeOver)
        } else {
            (None, FinishKind::Draw)
        })
    }

    fn record_finish(&mut self, winner: Option<Side>, kind: FinishKind) {
        self.winner = winner;
        self.finish = kind;
        match winner {
            Some(side) => self.score.match_wins[side.index()] += 1,
            None => self.score.draws += 1,
        }
        log::info!(
            "Round {} finished ({:?}), winner: {}.",
            self.round_number,
            kind,
            winner.map_or_else(|| "none".to_string(), |side| side.to_string())
        );
    }

    /// Treats the active member of `side` as fresh, as when a turns member
    /// steps in for a defeated teammate.
    pub fn start_fresh_member(&mut self, side: Side) {
        self.rounds_played[side.index()] = 0;
    }

    /// Moves the counters past a finished round.
    pub fn advance_round(&mut self) {
        self.round_number += 1;
        for played in &mut self.rounds_played {
            *played += 1;
        }
    }
}

fn intro_length(rules: &RoundRules) -> i32 {
    rules
        .start_wait_time
        .saturating_add(rules.ctrl_time)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(hit: i32, wait: i32, win: i32) -> RoundRules {
        RoundRules {
            hit_stun_time: hit,
            wait_time: wait,
            win_time: win,
            start_wait_time: 5,
            ctrl_time: 3,
            ..RoundRules::default()
        }
    }

    fn controller(hit: i32, wait: i32, win: i32) -> RoundController {
        RoundController::new(rules(hit, wait, win), [TeamConfiguration::default(); 2])
    }

    #[test]
    fn test_round_thresholds() {
        let mut round = controller(10, 20, 30);

        round.set_intro_countdown(-9);
        assert!(!round.round_end());
        assert!(!round.round_over(true, false));

        round.set_intro_countdown(-11);
        assert!(round.round_end());
        assert!(!round.round_over(true, false));

        round.set_intro_countdown(-61);
        assert!(round.round_over(true, false));
    }

    #[test]
    fn test_phase_is_derived_from_countdown() {
        let mut round = controller(10, 20, 30);
        assert_eq!(round.phase(), RoundPhase::Intro);
        round.set_intro_countdown(0);
        assert_eq!(round.phase(), RoundPhase::Fight);
        round.set_intro_countdown(-1);
        assert_eq!(round.phase(), RoundPhase::PostRound);
    }

    #[test]
    fn test_skip_ahead_only_shortens_the_wait() {
        let mut round = controller(10, 20, 30);
        round.set_intro_countdown(-12);

        // Needs a tick frame and a button.
        assert!(!round.round_over(false, true));
        assert_eq!(round.intro_countdown(), -12);

        assert!(!round.round_over(true, true));
        assert_eq!(round.intro_countdown(), -60 + 5);
        assert!(round.win_skipped());

        // Already past the skip point: unchanged.
        round.set_intro_countdown(-58);
        round.round_over(true, true);
        assert_eq!(round.intro_countdown(), -58);
    }

    #[test]
    fn test_match_over() {
        let mut round = controller(10, 20, 30);
        round.restore_score(Score {
            match_wins: [2, 1],
            draws: 0,
        });
        assert!(round.match_over());
        round.restore_score(Score {
            match_wins: [1, 1],
            draws: 0,
        });
        assert!(!round.match_over());
    }

    #[test]
    fn test_draw_limit_ends_match() {
        let mut rules = rules(10, 20, 30);
        rules.max_draw_games = Some(2);
        let mut round = RoundController::new(rules, [TeamConfiguration::default(); 2]);
        round.restore_score(Score {
            match_wins: [0, 0],
            draws: 2,
        });
        assert!(round.match_over());
    }

    #[test]
    fn test_long_durations_saturate() {
        // --- 1. ARRANGE ---
        let mut round = controller(i32::MAX / 2, i32::MAX / 2, i32::MAX / 2);
        let mut roster = Roster::default();

        // --- 2. ACT ---
        round.begin_round(&mut roster);

        // --- 3. ASSERT ---
        assert_eq!(round.waitdown(), i32::MAX);
        assert_eq!(round.intro_countdown(), 5 + 3 + 1);
        round.set_intro_countdown(i32::MIN);
        assert!(round.round_over(true, false));
    }
}
