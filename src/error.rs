use thiserror::Error;

/// Error taxonomy for the control plane, per the five kinds the engine must
/// distinguish: validation, state precondition, protocol failure, resource
/// failure and fatal (persistence/tick-service) errors.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Ill-formed request: nil slice, malformed term, missing resource type.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation not legal from the reservation's current (state, pending).
    #[error("illegal state transition for reservation {reservation}: {reason}")]
    StatePrecondition { reservation: String, reason: String },

    /// Peer rejected the request or the call timed out.
    #[error("protocol failure for reservation {reservation}: {reason}")]
    ProtocolFailure { reservation: String, reason: String },

    /// Concrete resource setup/probe/close error.
    #[error("resource failure for reservation {reservation}: {reason}")]
    ResourceFailure { reservation: String, reason: String },

    /// Persistence or tick-service failure; the actor halts its kernel.
    #[error("fatal actor error: {0}")]
    Fatal(String),

    #[error("unknown peer: {0}")]
    UnknownPeer(String),

    #[error("reservation not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ControlPlaneError>;
