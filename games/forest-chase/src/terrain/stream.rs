use std::collections::VecDeque;

use chase_engine::{PhysicsWorld, PoseBuffer, RandomSource};
use glam::Vec2;
use serde::Deserialize;

use super::chunk::{ChunkConfig, ChunkGeometry, ChunkId, TerrainChunk};
use super::error::TerrainError;

/// Sliding-window parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Chunks kept alive at once.
    pub window_chunks: usize,
    /// Distance, in chunk lengths past the origin, of the first streaming trigger.
    pub trigger_lead: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_chunks: 4,
            trigger_lead: 2.5,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.window_chunks < 2 {
            return Err(TerrainError::InvalidConfig("window must hold at least 2 chunks"));
        }
        if !self.trigger_lead.is_finite() {
            return Err(TerrainError::InvalidConfig("trigger lead must be finite"));
        }
        // The oldest chunk is evicted at `lead` chunk lengths past its start.
        if self.trigger_lead < 1.0 {
            return Err(TerrainError::InvalidConfig(
                "trigger lead below one chunk evicts the chunk under the vehicle",
            ));
        }
        // The newest chunk starts `window - 1` chunk lengths past the oldest.
        if self.trigger_lead > (self.window_chunks - 1) as f32 {
            return Err(TerrainError::InvalidConfig(
                "trigger lead past the newest chunk leaves no corridor ahead",
            ));
        }
        Ok(())
    }
}

/// What one streaming step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStep {
    pub spawned: ChunkId,
    pub evicted: ChunkId,
}

/// Endless corridor: a window of chained chunks that advances with the vehicle.
///
/// Owns every live chunk. Chunks leave the window only through this type, and
/// their collision bodies are released before they are dropped.
pub struct TerrainStream {
    chunks: VecDeque<TerrainChunk>,
    next_trigger: f32,
    next_id: u64,
    generated: u64,
    chunk_config: ChunkConfig,
}

impl TerrainStream {
    /// Build the initial window chained from `origin`.
    pub fn new(
        physics: &mut PhysicsWorld,
        origin: Vec2,
        chunk_config: &ChunkConfig,
        config: &StreamConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, TerrainError> {
        config.validate()?;
        chunk_config.validate()?;

        let mut stream = Self {
            chunks: VecDeque::with_capacity(config.window_chunks + 1),
            next_trigger: origin.y + config.trigger_lead * chunk_config.length(),
            next_id: 0,
            generated: 0,
            chunk_config: chunk_config.clone(),
        };

        let mut anchor = origin;
        for _ in 0..config.window_chunks {
            match stream.append(physics, anchor, rng).map(TerrainChunk::exit_anchor) {
                Ok(exit) => anchor = exit,
                Err(err) => {
                    stream.clear(physics);
                    return Err(err);
                }
            }
        }

        log::debug!(
            "terrain window ready: {} chunks, first trigger at {:.1}",
            stream.chunks.len(),
            stream.next_trigger
        );
        Ok(stream)
    }

    fn append(
        &mut self,
        physics: &mut PhysicsWorld,
        entry: Vec2,
        rng: &mut dyn RandomSource,
    ) -> Result<&TerrainChunk, TerrainError> {
        let geometry = ChunkGeometry::generate(entry, &self.chunk_config, rng)?;
        let id = ChunkId(self.next_id);
        self.next_id += 1;
        self.generated += 1;

        self.chunks
            .push_back(TerrainChunk::build(physics, id, geometry));
        Ok(&self.chunks[self.chunks.len() - 1])
    }

    /// Stream at most one chunk once `forward_position` passes the trigger.
    ///
    /// The new chunk chains from the last exit anchor and the oldest chunk is
    /// released in the same call.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        forward_position: f32,
        rng: &mut dyn RandomSource,
    ) -> Result<Option<StreamStep>, TerrainError> {
        if forward_position <= self.next_trigger {
            return Ok(None);
        }

        let Some(anchor) = self.last_exit() else {
            return Err(TerrainError::InvalidConfig("stream has no chunks to chain from"));
        };
        let (spawned_id, length) = self
            .append(physics, anchor, rng)
            .map(|chunk| (chunk.id(), chunk.geometry().length()))?;
        self.next_trigger += length;

        let Some(mut oldest) = self.chunks.pop_front() else {
            return Err(TerrainError::InvalidConfig("stream has no chunks to evict"));
        };
        oldest.dispose(physics);

        log::debug!(
            "chunk {:?} spawned, chunk {:?} evicted, next trigger {:.1}",
            spawned_id,
            oldest.id(),
            self.next_trigger
        );

        Ok(Some(StreamStep {
            spawned: spawned_id,
            evicted: oldest.id(),
        }))
    }

    /// Release one chunk. Returns `false`, changing nothing, when `id` is not live.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld, id: ChunkId) -> bool {
        let Some(index) = self.chunks.iter().position(|chunk| chunk.id() == id) else {
            return false;
        };
        if let Some(mut chunk) = self.chunks.remove(index) {
            chunk.dispose(physics);
        }
        true
    }

    /// Release every chunk.
    pub fn clear(&mut self, physics: &mut PhysicsWorld) {
        for mut chunk in self.chunks.drain(..) {
            chunk.dispose(physics);
        }
    }

    pub fn render(&self, poses: &mut PoseBuffer) {
        for chunk in &self.chunks {
            poses.push(chunk.render());
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Live chunks, oldest first.
    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.iter()
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.iter().any(|chunk| chunk.id() == id)
    }

    /// Chunks that start at or beyond `position`.
    pub fn chunks_ahead(&self, position: f32) -> usize {
        self.chunks
            .iter()
            .filter(|chunk| chunk.span().0 >= position)
            .count()
    }

    /// Chunks that end at or before `position`.
    pub fn chunks_behind(&self, position: f32) -> usize {
        self.chunks
            .iter()
            .filter(|chunk| chunk.span().1 <= position)
            .count()
    }

    pub fn next_trigger(&self) -> f32 {
        self.next_trigger
    }

    /// Chunks generated over the stream's lifetime.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    pub fn last_exit(&self) -> Option<Vec2> {
        self.chunks.back().map(TerrainChunk::exit_anchor)
    }
}
