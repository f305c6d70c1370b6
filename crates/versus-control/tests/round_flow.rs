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

use approx::assert_relative_eq;
use std::sync::Arc;
use versus_control::life::{apply_power_share, level_power};
use versus_control::{FinishKind, LifeScaler, RoundController, RoundEvent, RoundPhase, RoundTransition};
use versus_core::config::{LifeRules, RoundRules};
use versus_core::entity::{Combatant, EntityDefinition, Roster};
use versus_core::team::{Side, SlotIndex, TeamConfiguration, TeamMode, MAX_SLOTS};
use versus_core::world::{FreezeKind, FreezeRequest, SpecialFlags, StepReport};

fn slot(i: usize) -> SlotIndex {
    SlotIndex::new(i).unwrap()
}

fn entity(name: &str, life: i32, power: i32) -> Arc<EntityDefinition> {
    let mut def = EntityDefinition::new(name, format!("chars/{name}.def"));
    def.life = life;
    def.power = power;
    Arc::new(def)
}

fn duel() -> Roster {
    let mut roster = Roster::default();
    roster.insert(Combatant::new(slot(0), entity("kfm", 1000, 3000), 1));
    roster.insert(Combatant::new(slot(1), entity("sf", 1000, 3000), 1));
    roster
}

fn team(mode: TeamMode, roster_size: u32) -> TeamConfiguration {
    TeamConfiguration {
        mode,
        roster_size,
        match_wins_required: 2,
    }
}

fn quick_rules() -> RoundRules {
    RoundRules {
        hit_stun_time: 2,
        wait_time: 2,
        win_time: 2,
        start_wait_time: 2,
        ctrl_time: 1,
        round_time: Some(50),
        max_draw_games: None,
        helper_max: 56,
    }
}

/// Runs one logical tick without world activity.
fn tick(round: &mut RoundController, roster: &mut Roster) -> Option<RoundEvent> {
    round.begin_tick();
    round.absorb(&StepReport::default());
    round.end_tick(roster)
}

#[test]
fn test_single_vs_simultaneous_life_pool() {
    // --- 1. ARRANGE ---
    let teams = [team(TeamMode::Single, 1), team(TeamMode::Simultaneous, 2)];
    let rules = LifeRules {
        life_mul: 1.0,
        team_1vs2_life: 1.5,
    };
    let mut roster = duel();
    roster.insert(Combatant::new(slot(3), entity("kfm", 1000, 3000), 1));

    // --- 2. ACT ---
    let scaler = LifeScaler::new(rules, teams, [0; MAX_SLOTS], &roster);
    scaler.apply(&mut roster, 1, [0, 0]);

    // --- 3. ASSERT ---
    assert_eq!(roster.get(slot(0)).unwrap().life_max, 1500);
    assert_eq!(roster.get(slot(0)).unwrap().life, 1500);
    // Each simultaneous member gets half against a single opponent.
    assert_eq!(roster.get(slot(1)).unwrap().life_max, 500);
    assert_eq!(roster.get(slot(3)).unwrap().life_max, 500);
}

#[test]
fn test_levels_normalize_and_scale() {
    let teams = [TeamConfiguration::default(); 2];
    let mut roster = duel();
    let mut levels = [0; MAX_SLOTS];
    levels[0] = 14;
    levels[1] = 2;

    let scaler = LifeScaler::new(LifeRules::default(), teams, levels, &roster);
    assert_eq!(scaler.level(slot(1)), 0);
    assert_eq!(scaler.level(slot(0)), 12);

    scaler.apply(&mut roster, 1, [0, 0]);
    // Twelve levels halve the life pool.
    assert_eq!(roster.get(slot(0)).unwrap().life_max, 500);
    assert_eq!(roster.get(slot(1)).unwrap().life_max, 1000);
    assert_relative_eq!(level_power(12), 2.0, epsilon = 1e-12);
}

#[test]
fn test_later_rounds_rescale_damage_proportionally() {
    let teams = [TeamConfiguration::default(); 2];
    let mut roster = duel();
    roster.get_mut(slot(0)).unwrap().life = 401;
    let mut levels = [0; MAX_SLOTS];
    levels[0] = 12;

    let scaler = LifeScaler::new(LifeRules::default(), teams, levels, &roster);
    scaler.apply(&mut roster, 2, [1, 1]);

    let fighter = roster.get(slot(0)).unwrap();
    assert_eq!(fighter.life_max, 500);
    // Remaining life shrinks with the pool, rounded up.
    assert_eq!(fighter.life, 201);
    assert_eq!(roster.get(slot(1)).unwrap().life, 1000);
}

#[test]
fn test_first_round_empties_power() {
    let mut roster = duel();
    roster.get_mut(slot(0)).unwrap().power = 2500;
    let scaler = LifeScaler::new(LifeRules::default(), [TeamConfiguration::default(); 2], [0; MAX_SLOTS], &roster);
    scaler.apply(&mut roster, 1, [0, 0]);
    assert_eq!(roster.get(slot(0)).unwrap().power, 0);
}

#[test]
fn test_power_share_uses_largest_capacity() {
    let mut roster = Roster::default();
    roster.insert(Combatant::new(slot(0), entity("a", 1000, 3000), 1));
    roster.insert(Combatant::new(slot(2), entity("b", 1000, 5000), 1));
    roster.insert(Combatant::new(slot(1), entity("c", 1000, 1000), 1));

    apply_power_share(&mut roster, [true, false]);
    assert_eq!(roster.get(slot(0)).unwrap().power_max, 3000);
    assert_eq!(roster.get(slot(2)).unwrap().power_max, 5000);
    assert_eq!(roster.get(slot(1)).unwrap().power_max, 1000);
}

#[test]
fn test_knockout_decides_round_and_match() {
    // --- 1. ARRANGE ---
    let teams = [TeamConfiguration::default(); 2];
    let mut round = RoundController::new(quick_rules(), teams);
    let mut roster = duel();
    let scaler = LifeScaler::new(LifeRules::default(), teams, [0; MAX_SLOTS], &roster);
    round.begin_round(&mut roster);

    // --- 2. ACT: play the intro out ---
    let mut started = false;
    for _ in 0..4 {
        started |= tick(&mut round, &mut roster) == Some(RoundEvent::FightStarted);
    }
    assert!(started);
    assert_eq!(round.phase(), RoundPhase::Fight);
    assert!(roster.get(slot(0)).unwrap().ctrl);

    roster.get_mut(slot(1)).unwrap().life = 0;
    let event = tick(&mut round, &mut roster);

    // --- 3. ASSERT ---
    assert_eq!(
        event,
        Some(RoundEvent::Finished {
            winner: Some(Side::One),
            kind: FinishKind::Normal
        })
    );
    assert_eq!(round.match_wins(), [1, 0]);

    while !round.round_over(true, false) {
        tick(&mut round, &mut roster);
    }
    assert_eq!(scaler.finish_round(&mut round, &mut roster), RoundTransition::NextRound);
    assert_eq!(round.round_number(), 2);
    assert_eq!(round.rounds_played(), [1, 1]);
    assert_eq!(roster.get(slot(1)).unwrap().life, 1000);
}

#[test]
fn test_round_not_over_blocks_the_finish() {
    let teams = [TeamConfiguration::default(); 2];
    let mut round = RoundController::new(quick_rules(), teams);
    let mut roster = duel();
    round.begin_round(&mut roster);
    round.set_intro_countdown(0);
    roster.get_mut(slot(0)).unwrap().life = 0;

    round.begin_tick();
    round.absorb(&StepReport {
        special_flags: SpecialFlags::ROUND_NOT_OVER,
        ..StepReport::default()
    });
    assert_eq!(round.end_tick(&mut roster), None);

    // The flag lapses with the tick.
    assert!(matches!(
        tick(&mut round, &mut roster),
        Some(RoundEvent::Finished { winner: Some(Side::Two), .. })
    ));
}

#[test]
fn test_freeze_halts_round_clock() {
    let teams = [TeamConfiguration::default(); 2];
    let mut round = RoundController::new(quick_rules(), teams);
    let mut roster = duel();
    round.begin_round(&mut roster);
    round.set_intro_countdown(0);

    round.begin_tick();
    round.absorb(&StepReport {
        freeze_requests: vec![FreezeRequest {
            kind: FreezeKind::Super,
            duration: -3,
            owner: slot(0),
            pause_background: false,
            end_command_buffer_time: 0,
        }],
        ..StepReport::default()
    });
    round.end_tick(&mut roster);
    let before = round.round_timer();

    for _ in 0..3 {
        tick(&mut round, &mut roster);
        assert!(round.freeze().any_active());
        assert_eq!(round.round_timer(), before);
    }
    tick(&mut round, &mut roster);
    assert!(!round.freeze().any_active());
    assert_eq!(round.round_timer(), before.map(|t| t - 1));
}

#[test]
fn test_time_over_goes_to_healthier_side() {
    let mut rules = quick_rules();
    rules.round_time = Some(2);
    let mut round = RoundController::new(rules, [TeamConfiguration::default(); 2]);
    let mut roster = duel();
    round.begin_round(&mut roster);
    round.set_intro_countdown(0);
    roster.get_mut(slot(0)).unwrap().life = 300;

    assert_eq!(tick(&mut round, &mut roster), None);
    assert_eq!(
        tick(&mut round, &mut roster),
        Some(RoundEvent::Finished {
            winner: Some(Side::Two),
            kind: FinishKind::TimeOver
        })
    );
}

#[test]
fn test_double_knockout_is_a_draw() {
    let mut round = RoundController::new(quick_rules(), [TeamConfiguration::default(); 2]);
    let mut roster = duel();
    round.begin_round(&mut roster);
    round.set_intro_countdown(0);
    for fighter in roster.iter_mut() {
        fighter.life = 0;
    }
    assert_eq!(
        tick(&mut round, &mut roster),
        Some(RoundEvent::Finished {
            winner: None,
            kind: FinishKind::Draw
        })
    );
    assert_eq!(round.draws(), 1);
}

#[test]
fn test_match_end_rewards_both_sides() {
    let teams = [TeamConfiguration::default(); 2];
    let mut round = RoundController::new(quick_rules(), teams);
    let mut roster = duel();
    let scaler = LifeScaler::new(LifeRules::default(), teams, [0; MAX_SLOTS], &roster);
    round.begin_round(&mut roster);
    round.restore_score(versus_control::round::Score {
        match_wins: [0, 1],
        draws: 0,
    });
    round.set_intro_countdown(0);
    roster.get_mut(slot(0)).unwrap().life = 0;
    roster.get_mut(slot(1)).unwrap().life = 250;
    tick(&mut round, &mut roster);
    assert!(round.match_over());

    assert_eq!(scaler.finish_round(&mut round, &mut roster), RoundTransition::FightOver);
    assert_eq!(roster.get(slot(1)).unwrap().life, 250);
    assert_eq!(roster.get(slot(0)).unwrap().life, 0);
}

#[test]
fn test_turns_loss_ends_the_fight_early() {
    let teams = [team(TeamMode::Turns, 3), TeamConfiguration::default()];
    let mut round = RoundController::new(quick_rules(), teams);
    let mut roster = duel();
    let scaler = LifeScaler::new(LifeRules::default(), teams, [0; MAX_SLOTS], &roster);
    round.begin_round(&mut roster);
    round.set_intro_countdown(0);
    roster.get_mut(slot(0)).unwrap().life = 0;
    tick(&mut round, &mut roster);

    assert!(!round.match_over());
    assert_eq!(scaler.finish_round(&mut round, &mut roster), RoundTransition::FightOver);
    // The winning side keeps its life with a neutral level bonus.
    assert_eq!(roster.get(slot(1)).unwrap().life, 1000);
}
