//! Error types for the claw machine crate.

use thiserror::Error;

/// Errors that can occur while configuring or driving a session.
#[derive(Debug, Error)]
pub enum ClawError {
    /// Settings file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings JSON could not be parsed.
    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Geometry or timing values that cannot produce a playable machine.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// No toy was created with this creation index.
    #[error("unknown toy index: {0}")]
    UnknownToy(u32),
}

impl ClawError {
    /// Creates an invalid settings error.
    #[must_use]
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings(reason.into())
    }
}
