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

//! Runtime configuration, read from a JSON file at startup.

use crate::error::ConfigError;
use crate::team::{TeamConfiguration, TeamMode, MAX_SIMUL, MAX_SLOTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durations, in logical ticks, that shape a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    /// Ticks after the finish during which hits still land.
    pub hit_stun_time: i32,
    /// Ticks to wait after the hit window before the win pose.
    pub wait_time: i32,
    /// Ticks the win pose lasts.
    pub win_time: i32,
    /// Ticks of intro before the round announcement.
    pub start_wait_time: i32,
    /// Ticks between the announcement and players gaining control.
    pub ctrl_time: i32,
    /// Round timer in ticks; `None` disables time over.
    pub round_time: Option<u32>,
    /// The match ends after this many drawn rounds; `None` means never.
    pub max_draw_games: Option<u32>,
    /// First runtime id handed to helpers.
    pub helper_max: i32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            hit_stun_time: 10,
            wait_time: 45,
            win_time: 45,
            start_wait_time: 30,
            ctrl_time: 30,
            round_time: Some(99 * 60),
            max_draw_games: None,
            helper_max: 56,
        }
    }
}

/// Life pool multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeRules {
    /// Global multiplier applied to every base life.
    pub life_mul: f32,
    /// Multiplier for a lone fighter facing a simultaneous team.
    pub team_1vs2_life: f32,
}

impl Default for LifeRules {
    fn default() -> Self {
        Self {
            life_mul: 1.0,
            team_1vs2_life: 1.0,
        }
    }
}

/// Background loader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Sleep between polls of the selection, in milliseconds.
    pub poll_interval_ms: u64,
    /// Number of slots the loader prepares.
    pub max_slots: usize,
    /// Seed for random stage picks; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            max_slots: MAX_SLOTS,
            rng_seed: None,
        }
    }
}

/// Debug aids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the debug overlay from the start.
    pub draw: bool,
    /// Script run to build the overlay, if any.
    pub script: Option<PathBuf>,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames presented per second.
    pub target_fps: u32,
    /// Pace multiplier while fast-forwarding a replay.
    pub replay_fast_forward_factor: u32,
    /// Logical ticks per presented frame.
    pub turbo: f32,
    /// Round timings.
    pub rules: RoundRules,
    /// Life multipliers.
    pub life: LifeRules,
    /// Team setup of each side.
    pub teams: [TeamConfiguration; 2],
    /// Whether each side shares one power capacity.
    pub power_share: [bool; 2],
    /// Apply per-palette handicaps from `handicap_file`.
    pub auto_level: bool,
    /// Handicap table location.
    pub handicap_file: PathBuf,
    /// Loader settings.
    pub loader: LoaderConfig,
    /// Debug settings.
    pub debug: DebugConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            replay_fast_forward_factor: 4,
            turbo: 1.0,
            rules: RoundRules::default(),
            life: LifeRules::default(),
            teams: [TeamConfiguration::default(); 2],
            power_share: [false; 2],
            auto_level: false,
            handicap_file: PathBuf::from("autolevel.txt"),
            loader: LoaderConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Reads the configuration at `path`.
    ///
    /// A missing file yields the defaults; an unreadable, malformed or
    /// out-of-range one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No configuration at '{}', using defaults.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_json::from_str(&text)?;
        config.validate()
    }

    /// Rejects values the match loop cannot run with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.target_fps == 0 {
            return Err(invalid("target_fps", "must be at least 1"));
        }
        if !(self.turbo.is_finite() && self.turbo >= 0.0) {
            return Err(invalid("turbo", "must be a non-negative number"));
        }
        let durations = [
            ("rules.hit_stun_time", self.rules.hit_stun_time),
            ("rules.wait_time", self.rules.wait_time),
            ("rules.win_time", self.rules.win_time),
            ("rules.start_wait_time", self.rules.start_wait_time),
            ("rules.ctrl_time", self.rules.ctrl_time),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, ticks)| *ticks < 0) {
            return Err(invalid(*field, "must not be negative"));
        }
        if self.loader.max_slots == 0 || self.loader.max_slots > MAX_SLOTS {
            return Err(invalid(
                "loader.max_slots",
                format!("must be between 1 and {MAX_SLOTS}"),
            ));
        }
        for team in &self.teams {
            if team.match_wins_required == 0 {
                return Err(invalid("teams.match_wins_required", "must be at least 1"));
            }
            if team.mode == TeamMode::Simultaneous && team.roster_size as usize > MAX_SIMUL {
                return Err(invalid(
                    "teams.roster_size",
                    format!("at most {MAX_SIMUL} simultaneous members"),
                ));
            }
        }
        Ok(self)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
