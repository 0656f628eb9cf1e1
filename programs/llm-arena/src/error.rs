//! Error taxonomy of an experiment run
//!
//! Errors caused by unpredictable model output never reach this level: the
//! engine turns them into degraded sample rows. Everything here aborts the run.

use game_logic::GameError;
use thiserror::Error;

/// Failure of the completion service boundary
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("completion request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion service returned no turns")]
    Empty,
}

/// Fatal error of an experiment run
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ArenaError {
    /// Whether this error only spoils the current sample
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ArenaError::Game(e) if e.is_recoverable())
    }
}
