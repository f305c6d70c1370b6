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

//! Contracts for the subsystems that turn selections into loaded assets.
//!
//! The loader never decodes anything itself. It drives three backends:
//! - a [`BehaviorCompiler`] producing the compiled behavior program of an entity,
//! - an [`EntityDecoder`] reading definitions and portraits,
//! - a [`StageLoader`] producing the stage of the match.
//!
//! Decoding may need a thread-affine graphics context. The loader brackets
//! every batch of decoding work with a [`ContextBinding`] so backends can rely
//! on the context being current on the loading thread.

mod payload;

pub use payload::AssetPayload;

use crate::entity::EntityDefinition;
use crate::error::LoadError;
use crate::team::SlotIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The compiled behavior program of an entity. Its contents are opaque to
/// everything but the world simulating it.
#[derive(Debug, Clone)]
pub struct CompiledBehavior(AssetPayload);

impl CompiledBehavior {
    /// Wraps a backend-specific program.
    pub fn new<T: Send + Sync + 'static>(program: T) -> Self {
        Self(AssetPayload::new(program))
    }

    /// Returns the program when it is of type `T`.
    pub fn downcast_ref<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// Which portrait of an entity to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortraitKind {
    /// The face shown on the life bar.
    Face,
    /// The small face shown for waiting teammates in turns mode.
    TeammateFace,
}

/// A decoded portrait sprite.
#[derive(Debug, Clone)]
pub struct Portrait {
    /// Which portrait this is.
    pub kind: PortraitKind,
    /// Backend-specific image data.
    pub image: AssetPayload,
}

/// Everything the loader prepared for one slot.
#[derive(Debug, Clone)]
pub struct LoadedEntity {
    /// Decoded definition.
    pub definition: Arc<EntityDefinition>,
    /// Compiled behavior program.
    pub behavior: CompiledBehavior,
    /// Palette to draw with, 1-based.
    pub palette_no: u32,
    /// Life bar face, if the entity has one.
    pub face: Option<Portrait>,
    /// Faces of the side's roster in selection order, turns mode only.
    pub teammate_faces: Vec<Option<Portrait>>,
}

/// A loaded stage.
#[derive(Debug, Clone)]
pub struct StageHandle {
    /// Definition file the stage came from.
    pub definition: PathBuf,
    /// Display name.
    pub name: String,
    /// Background music to play during the match.
    pub music: Option<PathBuf>,
    /// Whether background elements restart every round.
    pub reset_background: bool,
    /// Backend-specific stage data.
    pub data: AssetPayload,
}

/// Compiles the behavior program of an entity.
pub trait BehaviorCompiler: Send + Sync {
    /// Compiles the behavior of the entity at `definition` for `slot`.
    fn compile(&self, slot: SlotIndex, definition: &Path) -> Result<CompiledBehavior, LoadError>;
}

/// Decodes entity definitions and their portraits.
pub trait EntityDecoder: Send + Sync {
    /// Reads the definition file of an entity.
    fn decode(&self, definition: &Path) -> Result<EntityDefinition, LoadError>;

    /// Decodes one portrait of an entity.
    fn decode_portrait(
        &self,
        definition: &Path,
        kind: PortraitKind,
        palette_no: u32,
    ) -> Result<Portrait, LoadError>;
}

/// Loads stages.
pub trait StageLoader: Send + Sync {
    /// Loads the stage at `definition`.
    fn load(&self, definition: &Path) -> Result<StageHandle, LoadError>;
}

/// A thread-affine context decoding work must run under.
pub trait DecodeContext: Send + Sync {
    /// Makes the context current on the calling thread.
    fn bind(&self) {}
    /// Releases the context from the calling thread.
    fn release(&self) {}
}

/// A [`DecodeContext`] for backends that need none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDecodeContext;

impl DecodeContext for NoDecodeContext {}

/// Keeps a [`DecodeContext`] bound for as long as it lives.
pub struct ContextBinding<'a> {
    context: &'a dyn DecodeContext,
}

impl<'a> ContextBinding<'a> {
    /// Binds `context` until the returned guard is dropped.
    pub fn new(context: &'a dyn DecodeContext) -> Self {
        context.bind();
        Self { context }
    }
}

impl Drop for ContextBinding<'_> {
    fn drop(&mut self) {
        self.context.release();
    }
}

/// The set of backends a loader drives.
#[derive(Clone)]
pub struct AssetBackends {
    /// Behavior compiler.
    pub compiler: Arc<dyn BehaviorCompiler>,
    /// Entity decoder.
    pub entities: Arc<dyn EntityDecoder>,
    /// Stage loader.
    pub stages: Arc<dyn StageLoader>,
    /// Context bracketing decoding work.
    pub decode_context: Arc<dyn DecodeContext>,
}
