//! Error types for the hiit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hiit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A phase plan violates one of its invariants (zero rounds, zero-length work, ...)
    ///
    /// Raised by `TimerEngine::start` and the sequencer before any run begins.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// User-entered value outside the range offered for a timer mode
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sequencer misuse (empty sequence, editing while running, bad index)
    #[error("Sequence error: {0}")]
    Sequence(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
