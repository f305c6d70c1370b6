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

//! Plays one headless match with the configuration given on the command
//! line (`versus-runtime [config.json] [--console]`).

mod demo;

use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use versus_core::config::RuntimeConfig;
use versus_core::platform::SystemTimeSource;
use versus_core::selection::MatchContext;
use versus_sdk::{Session, SessionOutcome};

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config_path = PathBuf::from("versus.json");
    let mut console = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--console" => console = true,
            path => config_path = PathBuf::from(path),
        }
    }

    let config = RuntimeConfig::load(&config_path)
        .with_context(|| format!("failed to load '{}'", config_path.display()))?;
    let seed = config.loader.rng_seed.unwrap_or(0);

    let context = Arc::new(MatchContext::new(demo::catalog()));
    demo::select(&context, &config);

    let mut session = Session::new(
        config,
        Arc::clone(&context),
        demo::backends(),
        demo::collaborators(seed),
        SystemTimeSource,
    );
    let dispatcher = session.match_loop_mut().dispatcher_mut();
    for (key, script) in demo::hotkeys() {
        dispatcher.bind(key, script);
    }
    if console {
        dispatcher.attach_console(spawn_console()?);
    }

    let outcome = session.run()?;
    let summary = match outcome {
        SessionOutcome::MatchOver(score) => serde_json::json!({
            "outcome": "match_over",
            "wins": score.match_wins,
            "draws": score.draws,
            "rounds": session.round().round_number() - 1,
        }),
        SessionOutcome::Cancelled => serde_json::json!({ "outcome": "cancelled" }),
        SessionOutcome::Aborted => serde_json::json!({ "outcome": "aborted" }),
        SessionOutcome::Quit => serde_json::json!({ "outcome": "quit" }),
    };
    log::info!("Session finished: {outcome:?}");
    println!("{summary}");
    Ok(())
}

/// Forwards stdin lines to the debug console.
fn spawn_console() -> Result<crossbeam_channel::Receiver<String>> {
    let (sender, receiver) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("versus-console".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if sender.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn the console thread")?;
    Ok(receiver)
}
