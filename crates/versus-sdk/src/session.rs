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

//! Runs matches end to end: loading, fighting and member changes.

use crate::fight::{Collaborators, FightOutcome, MatchLoop};
use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use versus_agents::{LoadPlan, Loader, LoaderState, MatchAssets};
use versus_control::life::apply_power_share;
use versus_control::round::Score;
use versus_control::{HandicapTable, LifeScaler, RoundController};
use versus_core::asset::AssetBackends;
use versus_core::config::RuntimeConfig;
use versus_core::entity::{Combatant, Roster};
use versus_core::platform::{SystemTimeSource, TimeSource};
use versus_core::selection::MatchContext;
use versus_core::team::{Side, SlotIndex, TeamMode, MAX_SLOTS};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The match was played to its end.
    MatchOver(Score),
    /// Loading was cancelled, usually because the application is closing.
    Cancelled,
    /// Input synchronization failed during a fight.
    Aborted,
    /// The window asked to close.
    Quit,
}

/// Owns everything one match needs and drives it to completion.
pub struct Session<T: TimeSource = SystemTimeSource> {
    config: RuntimeConfig,
    context: Arc<MatchContext>,
    loader: Loader,
    round: RoundController,
    roster: Roster,
    fight: MatchLoop<T>,
    collaborators: Collaborators,
    handicap: HandicapTable,
}

impl<T: TimeSource> Session<T> {
    /// Prepares a session. Nothing is loaded until [`run`](Self::run).
    pub fn new(
        config: RuntimeConfig,
        context: Arc<MatchContext>,
        backends: AssetBackends,
        collaborators: Collaborators,
        time: T,
    ) -> Self {
        let loader = Loader::new(Arc::clone(&context), backends, config.loader);
        let round = RoundController::new(config.rules, config.teams);
        let mut fight = MatchLoop::new(&config, time);
        if let Some(path) = &config.debug.script {
            match fs::read_to_string(path) {
                Ok(source) => fight.dispatcher_mut().set_startup_script(source),
                Err(e) => log::warn!("Debug script '{}' unavailable: {e}", path.display()),
            }
        }
        let handicap = if config.auto_level {
            HandicapTable::load(&config.handicap_file)
        } else {
            HandicapTable::empty()
        };
        Self {
            config,
            context,
            loader,
            round,
            roster: Roster::default(),
            fight,
            collaborators,
            handicap,
        }
    }

    /// The fight loop, for hotkey and console bindings.
    pub fn match_loop_mut(&mut self) -> &mut MatchLoop<T> {
        &mut self.fight
    }

    /// Round counters of the current match.
    pub fn round(&self) -> &RoundController {
        &self.round
    }

    /// Combatants of the current match.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Plays one match.
    ///
    /// Fails when the assets of the match cannot be loaded. A cancelled
    /// load is not an error.
    pub fn run(&mut self) -> Result<SessionOutcome> {
        self.start_match();
        loop {
            let plan = LoadPlan {
                teams: *self.round.teams(),
                match_wins: self.round.match_wins(),
                rounds_played: self.round.rounds_played(),
                round_number: self.round.round_number(),
            };
            let assets = match self.load(plan)? {
                Some(assets) => assets,
                None if self.collaborators.events.should_close() => return Ok(SessionOutcome::Quit),
                None => return Ok(SessionOutcome::Cancelled),
            };
            self.fight.set_reset_background(assets.stage.reset_background);
            self.enter(&assets);

            let scaler = LifeScaler::new(
                self.config.life,
                *self.round.teams(),
                self.levels(),
                &self.roster,
            );
            apply_power_share(&mut self.roster, self.config.power_share);
            scaler.apply(
                &mut self.roster,
                self.round.round_number(),
                self.round.rounds_played(),
            );

            match self
                .fight
                .run(&mut self.collaborators, &mut self.round, &mut self.roster, &scaler)
            {
                FightOutcome::MatchOver => return Ok(SessionOutcome::MatchOver(self.round.score())),
                FightOutcome::NextMember => {
                    for side in Side::BOTH {
                        let mode = self.round.teams()[side.index()].mode;
                        if mode == TeamMode::Turns && !self.round.is_winner(side) {
                            log::info!("{side} sends in its next member.");
                            self.round.start_fresh_member(side);
                        }
                    }
                }
                FightOutcome::Reload => self.start_match(),
                FightOutcome::Aborted => return Ok(SessionOutcome::Aborted),
                FightOutcome::Quit => return Ok(SessionOutcome::Quit),
            }
        }
    }

    /// Clears the score and counters of the previous match and unseats its
    /// combatants so the next load seats them afresh.
    fn start_match(&mut self) {
        self.round.reset_match();
        for slot in SlotIndex::all() {
            if self.roster.remove(slot).is_some() {
                self.collaborators.world.clear_slot(slot);
            }
        }
    }

    /// Runs a load pass while keeping frames and events flowing.
    fn load(&mut self, plan: LoadPlan) -> Result<Option<MatchAssets>> {
        self.loader.reset();
        if !self.loader.start(plan) {
            let error = self
                .loader
                .take_error()
                .context("the loader refused to start")?;
            return Err(error).context("failed to start loading the match");
        }

        let fps = self.fight.target_fps();
        while self.loader.poll() == LoaderState::Loading {
            let alive = self.fight.pacer_mut().advance(
                fps,
                self.collaborators.render.as_mut(),
                self.collaborators.events.as_mut(),
            );
            if !alive {
                self.context.request_shutdown();
                self.loader.reset();
                return Ok(None);
            }
        }

        match self.loader.state() {
            LoaderState::Complete => self
                .loader
                .take_assets()
                .map(Some)
                .context("the loader completed without assets"),
            LoaderState::Error => {
                let error = self
                    .loader
                    .take_error()
                    .context("the loader failed without an error")?;
                Err(error).context("failed to load the match")
            }
            LoaderState::Cancelled | LoaderState::NotYet | LoaderState::Loading => {
                log::info!("Loading cancelled.");
                Ok(None)
            }
        }
    }

    /// Seats the loaded entities, keeping combatants whose entity did not
    /// change so their life carries over.
    fn enter(&mut self, assets: &MatchAssets) {
        for slot in SlotIndex::all() {
            match assets.entity(slot) {
                Some(loaded) => {
                    let unchanged = self
                        .roster
                        .get(slot)
                        .is_some_and(|c| Arc::ptr_eq(c.definition(), &loaded.definition));
                    if unchanged {
                        if let Some(combatant) = self.roster.get_mut(slot) {
                            combatant.palette_no = loaded.palette_no;
                        }
                    } else {
                        self.roster.insert(Combatant::new(
                            slot,
                            Arc::clone(&loaded.definition),
                            loaded.palette_no,
                        ));
                    }
                }
                None => {
                    if self.roster.remove(slot).is_some() {
                        self.collaborators.world.clear_slot(slot);
                    }
                }
            }
        }
    }

    fn levels(&self) -> [i32; MAX_SLOTS] {
        let mut levels = [0; MAX_SLOTS];
        if self.handicap.is_empty() {
            return levels;
        }
        for combatant in self.roster.iter() {
            let definition = combatant.definition().definition.to_string_lossy();
            levels[combatant.slot().index()] = self.handicap.level(&definition, combatant.palette_no);
        }
        levels
    }
}
