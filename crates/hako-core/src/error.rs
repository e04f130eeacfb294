//! Error types for Hako

use thiserror::Error;

/// Result type alias using Hako's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during an export
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or ambiguous configuration (mapping tables, override
    /// registrations, scene description). Fatal before any translation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single material graph is unusable (no output node, unlinked
    /// surface input, runaway traversal). Fatal for that material only;
    /// the assembler degrades to a fallback material and continues.
    #[error("Structural error: {0}")]
    Structural(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
