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

//! Error types surfaced by the loader, script host, input synchronization
//! and configuration layers.

use crate::team::SlotIndex;
use std::path::PathBuf;
use thiserror::Error;

/// A failure while preparing the assets of a match.
///
/// Any of these ends the current load pass in the `Error` state.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The behavior program of an entity failed to compile.
    #[error("failed to compile behavior for {slot} from '{}': {reason}", definition.display())]
    Compile {
        /// Slot that was being prepared.
        slot: SlotIndex,
        /// Definition file of the entity.
        definition: PathBuf,
        /// Compiler diagnostic.
        reason: String,
    },
    /// The entity definition or its resources could not be decoded.
    #[error("failed to load entity '{}': {reason}", definition.display())]
    Entity {
        /// Definition file of the entity.
        definition: PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },
    /// The stage could not be loaded.
    #[error("failed to load stage '{}': {reason}", definition.display())]
    Stage {
        /// Definition file of the stage.
        definition: PathBuf,
        /// Loader diagnostic.
        reason: String,
    },
    /// A selection referenced a catalog entry that does not exist.
    #[error("catalog has no {kind} at index {index}")]
    Catalog {
        /// What was looked up ("entity" or "stage").
        kind: &'static str,
        /// The missing index.
        index: usize,
    },
    /// The background pass died before reporting a result.
    #[error("load pass terminated unexpectedly")]
    Interrupted,
    /// An I/O error while reading a resource.
    #[error("I/O error while loading: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure raised by the embedded script host.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script raised an error while executing.
    #[error("script execution failed: {0}")]
    Execution(String),
    /// A required script callback is not defined.
    #[error("script callback '{0}' is not defined")]
    MissingCallback(String),
}

/// A failure of the input layer while keeping peers in lock-step.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote peer went away.
    #[error("input peer disconnected: {0}")]
    Disconnected(String),
    /// A recorded input stream ran out of frames.
    #[error("input stream exhausted")]
    InputExhausted,
}

/// A failure while reading or validating the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for the expected schema.
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside of its accepted range.
    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
