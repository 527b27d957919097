//! Engine errors.
//!
//! Rule violations ("that character is exerted", "not enough ink") are not
//! errors: actions report them as `false` and log at debug level. The
//! variants here cover contract failures between the engine and its
//! collaborators.

use thiserror::Error;

/// Errors surfaced to the caller of an engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The installed ability executor failed on a typed effect.
    #[error("ability executor failed on `{kind}`: {message}")]
    Executor { kind: String, message: String },

    /// A legacy action verb the engine does not know.
    #[error("unknown effect action `{0}`")]
    UnknownAction(String),

    /// An effect descriptor that cannot be turned into a typed effect.
    #[error("invalid effect descriptor: {0}")]
    InvalidAst(String),

    /// A deck list names a card the registry doesn't have.
    #[error("unknown card `{0}`")]
    UnknownCard(String),

    /// Decks and configuration don't describe a playable game.
    #[error("invalid game setup: {0}")]
    Setup(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl EngineError {
    /// Build an executor failure.
    pub fn executor(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Executor {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Build an invalid-descriptor error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidAst(message.into())
    }
}
