use std::io;

/// Errors surfaced by the walkthrough library and its CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown script command `{0}` (expected reset, back, next, play, tick or jump:<i>)")]
    UnknownCommand(String),
    #[error("unknown step `{0}`")]
    UnknownStep(String),
    #[error("autoplay delay must be greater than zero")]
    InvalidDelay,
    #[error("logging has already been initialised")]
    LoggingAlreadyInitialised,
}

pub type Result<T> = std::result::Result<T, Error>;
