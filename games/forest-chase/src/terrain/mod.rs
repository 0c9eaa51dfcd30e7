pub mod chunk;
pub mod error;
pub mod stream;

pub use chunk::{ChunkConfig, ChunkGeometry, ChunkId, TerrainChunk};
pub use error::TerrainError;
pub use stream::{StreamConfig, StreamStep, TerrainStream};
