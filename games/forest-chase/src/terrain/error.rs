use std::fmt;

/// Why a corridor chunk could not be built.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The entry anchor had a NaN or infinite coordinate.
    NonFiniteAnchor { x: f32, y: f32 },
    /// A generation or streaming parameter cannot produce a corridor.
    InvalidConfig(&'static str),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerrainError::NonFiniteAnchor { x, y } => {
                write!(f, "chunk entry anchor is not finite: ({}, {})", x, y)
            }
            TerrainError::InvalidConfig(reason) => write!(f, "invalid terrain config: {}", reason),
        }
    }
}

impl std::error::Error for TerrainError {}
