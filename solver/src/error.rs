//! Error types.
//!
//! - Deduction failures: [`ClueError::Contradiction`]. Fatal to the Knowledge
//!   Base lineage that produced it; only the suggestion search discards them.
//! - Wire-format failures: [`ClueError::UnknownToken`],
//!   [`ClueError::MalformedSuggestion`]. The caller rejects the input.
//! - Caller mistakes: bad indices, observer-only operations, bad pool setup.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum ClueError {
    // ═══════════════════════════════════════════════════════════════════
    // Deduction
    // ═══════════════════════════════════════════════════════════════════
    #[error("Contradiction: {0}")]
    Contradiction(String),

    // ═══════════════════════════════════════════════════════════════════
    // Wire format
    // ═══════════════════════════════════════════════════════════════════
    #[error("Unknown token abbreviation: {0:?}")]
    UnknownToken(String),

    #[error("Malformed suggestion {input:?}: {reason}")]
    MalformedSuggestion { input: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════
    // Caller errors
    // ═══════════════════════════════════════════════════════════════════
    #[error("No legal suggestion remains")]
    NoLegalSuggestion,

    #[error("Unsupported player count: {0}")]
    InvalidPlayerCount(usize),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Knowledge base has no seat for this agent")]
    NotSeated,

    #[error("Hand cannot disprove the suggestion")]
    NothingToDisprove,

    #[error("Failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ClueError {
    pub fn is_contradiction(&self) -> bool {
        matches!(self, ClueError::Contradiction(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClueError>;

/// Shorthand used throughout the deduction code.
pub(crate) fn contradiction<T>(message: impl Into<String>) -> Result<T> {
    Err(ClueError::Contradiction(message.into()))
}
