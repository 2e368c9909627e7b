//! Error types for MindArena domain values

use thiserror::Error;

/// Errors raised while interpreting domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Archetype name not recognized
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),
}
