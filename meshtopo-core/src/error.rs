//! Error types for meshtopo

use thiserror::Error;

/// Main error type for meshtopo operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Non-manifold input: edge ({0}, {1}) is shared by {2} faces")]
    NonManifold(usize, usize, usize),

    #[error("Stale {0} handle: the entity has been removed")]
    StaleHandle(&'static str),

    #[error("Invalid {kind} ID {id}: only {count} exist")]
    InvalidId {
        kind: &'static str,
        id: usize,
        count: usize,
    },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Palette exhausted: face {face} has neighbours using all {palette_size} colors")]
    PaletteExhausted { face: usize, palette_size: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for meshtopo operations
pub type Result<T> = std::result::Result<T, Error>;
