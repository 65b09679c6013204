//! Error type shared by the page behaviors.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. Each behavior logs the error at its boundary and
//! falls back to a degraded mode (session-only theme, generic chat message,
//! no-op for missing markup) so one failure never blocks the rest of the page.

/// Failures surfaced by storage, network, and configuration glue.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("local storage unavailable")]
    StorageUnavailable,
    #[error("local storage rejected access: {0}")]
    Storage(String),
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat response undecodable: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid page config: {0}")]
    Config(String),
}
