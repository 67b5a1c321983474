use thiserror::Error;

/// Failure categories surfaced by collaborators during an act. The
/// dispatcher logs these rather than propagating them; the loop must
/// outlive any one bad network call or render.
#[derive(Debug, Error, Clone)]
pub enum KnobError {
    #[error("network error: {0}")]
    Network(String),
    #[error("display error: {0}")]
    Display(String),
    #[error("speech error: {0}")]
    Speech(String),
    #[error("command refused: {0}")]
    CommandRefused(String),
}
