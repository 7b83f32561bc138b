use thiserror::Error;

use crate::engine::EngineError;

/// Errors surfaced by the library API.
///
/// Engine failures are wrapped without modification so callers can apply
/// their own retry or backoff policy; nothing is retried here.
#[derive(Error, Debug)]
pub enum TeamError {
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
