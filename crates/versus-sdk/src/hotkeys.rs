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

//! Routes hotkey scripts and debug console lines through the script host.

use crossbeam_channel::{Receiver, TryRecvError};
use std::collections::HashMap;
use versus_core::script::{MatchCommand, ScriptHost, ShortcutKey};

/// Turns pressed shortcuts and console input into match commands.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    hotkeys: HashMap<ShortcutKey, String>,
    console: Option<Receiver<String>>,
    startup: Option<String>,
}

impl CommandDispatcher {
    /// A dispatcher with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `script` to `key`, replacing any previous binding.
    pub fn bind(&mut self, key: ShortcutKey, script: impl Into<String>) {
        self.hotkeys.insert(key, script.into());
    }

    /// Removes the binding of `key`.
    pub fn unbind(&mut self, key: ShortcutKey) -> Option<String> {
        self.hotkeys.remove(&key)
    }

    /// Attaches a source of debug console lines.
    pub fn attach_console(&mut self, lines: Receiver<String>) {
        self.console = Some(lines);
    }

    /// Sets a script run once at the start of every fight.
    pub fn set_startup_script(&mut self, source: impl Into<String>) {
        self.startup = Some(source.into());
    }

    /// Runs the startup script, if any.
    pub fn run_startup(&mut self, host: &mut dyn ScriptHost) -> Vec<MatchCommand> {
        let mut commands = Vec::new();
        if let Some(source) = &self.startup {
            run_script(host, source, &mut commands);
        }
        commands
    }

    /// Runs the scripts bound to `pressed` and every queued console line.
    ///
    /// Script failures are logged and skipped.
    pub fn dispatch(&mut self, host: &mut dyn ScriptHost, pressed: &[ShortcutKey]) -> Vec<MatchCommand> {
        let mut commands = Vec::new();
        for key in pressed {
            if let Some(script) = self.hotkeys.get(key) {
                run_script(host, script, &mut commands);
            }
        }

        let mut disconnected = false;
        if let Some(console) = &self.console {
            loop {
                match console.try_recv() {
                    Ok(line) => run_script(host, &line, &mut commands),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            log::debug!("Debug console closed.");
            self.console = None;
        }
        commands
    }
}

fn run_script(host: &mut dyn ScriptHost, source: &str, commands: &mut Vec<MatchCommand>) {
    match host.execute(source) {
        Ok(issued) => commands.extend(issued),
        Err(e) => log::warn!("Script failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_core::error::ScriptError;

    /// Understands `reset`, `reload` and `turbo <x>`.
    #[derive(Default)]
    struct TinyHost {
        executed: Vec<String>,
    }

    impl ScriptHost for TinyHost {
        fn execute(&mut self, source: &str) -> Result<Vec<MatchCommand>, ScriptError> {
            self.executed.push(source.to_string());
            match source.split_once(' ') {
                Some(("turbo", value)) => value
                    .parse()
                    .map(|t| vec![MatchCommand::SetTurbo(t)])
                    .map_err(|_| ScriptError::Execution(format!("bad turbo '{value}'"))),
                _ => match source {
                    "reset" => Ok(vec![MatchCommand::ResetRound]),
                    "reload" => Ok(vec![MatchCommand::Reload]),
                    other => Err(ScriptError::Execution(format!("unknown '{other}'"))),
                },
            }
        }
    }

    #[test]
    fn test_pressed_hotkeys_run_their_scripts() {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.bind(ShortcutKey::plain(4), "reset");
        dispatcher.bind(ShortcutKey::plain(4).with_ctrl(), "reload");
        let mut host = TinyHost::default();

        let commands = dispatcher.dispatch(&mut host, &[ShortcutKey::plain(4).with_ctrl(), ShortcutKey::plain(9)]);

        assert_eq!(commands, vec![MatchCommand::Reload]);
        assert_eq!(host.executed, vec!["reload".to_string()]);
    }

    #[test]
    fn test_console_lines_run_and_failures_are_skipped() {
        // --- 1. ARRANGE ---
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.attach_console(receiver);
        let mut host = TinyHost::default();
        sender.send("turbo 0.5".to_string()).unwrap();
        sender.send("explode".to_string()).unwrap();
        sender.send("reset".to_string()).unwrap();

        // --- 2. ACT ---
        let commands = dispatcher.dispatch(&mut host, &[]);
        drop(sender);
        let after_close = dispatcher.dispatch(&mut host, &[]);

        // --- 3. ASSERT ---
        assert_eq!(commands, vec![MatchCommand::SetTurbo(0.5), MatchCommand::ResetRound]);
        assert!(after_close.is_empty());
        assert!(dispatcher.console.is_none());
    }
}
