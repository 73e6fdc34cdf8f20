//! Error types for the room engine, grounded in `pmoplaylist::error`'s shape:
//! named variants for the errors callers are expected to match on, plus a
//! transparent catch-all for whatever the activity layer reports.

/// Errors a room can fail with.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("invalid room parameters: {0}")]
    InvalidParameters(String),

    #[error("room {0} does not exist")]
    RoomNotFound(String),

    #[error("room {0} already exists")]
    RoomAlreadyExists(String),

    /// A fatal workflow error: the creation acknowledgement activity failed
    /// (MTV), or an unrecognised signal route was received (MPE). Either
    /// one ends the room's run loop, per §7.
    #[error("room workflow failed fatally: {0}")]
    Fatal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RoomError>;
