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

//! The loader agent: owns the background thread and its lifecycle.

use super::cache::AssetCache;
use super::pass::{lock, LoadPass, MatchAssets, PassOutcome, PassProgress};
use super::slot::LoadPlan;
use super::state::{LoaderState, SharedState};
use crossbeam_channel::{Receiver, TryRecvError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use versus_core::asset::AssetBackends;
use versus_core::config::LoaderConfig;
use versus_core::error::LoadError;
use versus_core::selection::MatchContext;

/// Prepares match assets on a background thread.
///
/// A loader runs at most one pass at a time. Its state moves
/// `NotYet -> Loading -> {Complete, Error, Cancelled}` and only
/// [`Loader::reset`] brings it back to `NotYet`.
pub struct Loader {
    context: Arc<MatchContext>,
    backends: AssetBackends,
    config: LoaderConfig,
    state: SharedState,
    cache: Arc<Mutex<AssetCache>>,
    progress: Arc<Mutex<PassProgress>>,
    receiver: Option<Receiver<PassOutcome>>,
    handle: Option<JoinHandle<()>>,
    assets: Option<MatchAssets>,
    error: Option<LoadError>,
    passes: u64,
}

impl Loader {
    /// Creates an idle loader.
    pub fn new(context: Arc<MatchContext>, backends: AssetBackends, config: LoaderConfig) -> Self {
        Self {
            context,
            backends,
            config,
            state: SharedState::new(),
            cache: Arc::new(Mutex::new(AssetCache::default())),
            progress: Arc::new(Mutex::new(PassProgress::default())),
            receiver: None,
            handle: None,
            assets: None,
            error: None,
            passes: 0,
        }
    }

    /// Starts a pass for `plan`. Returns `false` unless the loader is idle.
    pub fn start(&mut self, plan: LoadPlan) -> bool {
        if !self.state.transition(LoaderState::NotYet, LoaderState::Loading) {
            log::warn!("Loader start ignored in state {:?}.", self.state.get());
            return false;
        }
        *lock(&self.progress) = PassProgress::default();
        self.assets = None;
        self.error = None;

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.passes)),
            None => StdRng::from_entropy(),
        };
        self.passes += 1;

        let pass = LoadPass {
            context: Arc::clone(&self.context),
            backends: self.backends.clone(),
            plan,
            cache: Arc::clone(&self.cache),
            state: self.state.clone(),
            progress: Arc::clone(&self.progress),
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
            max_slots: self.config.max_slots,
            rng,
        };

        let (sender, receiver) = crossbeam_channel::bounded(1);
        let spawned = thread::Builder::new()
            .name("versus-loader".to_string())
            .spawn(move || {
                let outcome = pass.run();
                // The receiver is gone only when the loader was dropped.
                let _ = sender.send(outcome);
            });

        match spawned {
            Ok(handle) => {
                self.receiver = Some(receiver);
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                log::error!("Failed to spawn the loader thread: {e}");
                self.error = Some(LoadError::Io(e));
                self.state.set(LoaderState::Error);
                false
            }
        }
    }

    /// Current state without blocking.
    pub fn poll(&mut self) -> LoaderState {
        let received = self.receiver.as_ref().map(|receiver| receiver.try_recv());
        match received {
            Some(Ok(outcome)) => self.settle(outcome),
            Some(Err(TryRecvError::Disconnected)) => {
                self.settle(PassOutcome::Failed(LoadError::Interrupted))
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }
        self.state.get()
    }

    /// Blocks until the running pass ends, then returns the state.
    pub fn wait(&mut self) -> LoaderState {
        let received = self.receiver.as_ref().map(|receiver| receiver.recv());
        if let Some(received) = received {
            self.settle(received.unwrap_or(PassOutcome::Failed(LoadError::Interrupted)));
        }
        self.state.get()
    }

    fn settle(&mut self, outcome: PassOutcome) {
        self.receiver = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("The loader thread panicked.");
            }
        }
        match outcome {
            PassOutcome::Complete(assets) => self.assets = Some(assets),
            PassOutcome::Failed(error) => {
                if matches!(error, LoadError::Interrupted) {
                    self.state.transition(LoaderState::Loading, LoaderState::Error);
                }
                self.error = Some(error);
            }
            PassOutcome::Cancelled => {}
        }
    }

    /// Current state, as last observed.
    pub fn state(&self) -> LoaderState {
        self.state.get()
    }

    /// What the running pass has finished so far.
    pub fn progress(&self) -> PassProgress {
        *lock(&self.progress)
    }

    /// The error that ended the last pass.
    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Hands out the error that ended the last pass.
    pub fn take_error(&mut self) -> Option<LoadError> {
        self.error.take()
    }

    /// Hands out the assets of a completed pass.
    pub fn take_assets(&mut self) -> Option<MatchAssets> {
        self.assets.take()
    }

    /// Cancels any running pass, waits for its thread and returns to
    /// `NotYet`. Calling it again is harmless.
    pub fn reset(&mut self) {
        if self.state.transition(LoaderState::Loading, LoaderState::Cancelled) {
            log::debug!("Cancelling the running load pass.");
        }
        if self.receiver.is_some() {
            self.wait();
        }
        self.state.set(LoaderState::NotYet);
        self.assets = None;
        self.error = None;
        *lock(&self.progress) = PassProgress::default();
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.reset();
    }
}
