use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Device identity already registered: {0}")]
    DuplicateIdentity(Uuid),

    #[error("Unknown device: {0}")]
    UnknownDevice(Uuid),

    #[error("Invalid streaming configuration: {0}")]
    InvalidStreamingConfiguration(String),

    #[error("Malformed snapshot for {id}: {reason}")]
    MalformedSnapshot { id: Uuid, reason: String },

    #[error("Invalid device structure: {0}")]
    InvalidDevice(String),

    #[error("Device registry was already restored")]
    AlreadyRestored,

    #[error("Device registry has not been restored yet")]
    NotRestored,

    #[error("Device set is static and cannot change at runtime")]
    ImmutableDeviceSet,

    #[error("Attribute is read-only: {0}")]
    ReadOnlyAttribute(String),

    #[error("Attribute is write-only: {0}")]
    WriteOnlyAttribute(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute {attribute} expects a {expected} value")]
    AttributeTypeMismatch {
        attribute: String,
        expected: &'static str,
    },

    #[error("Maximum concurrent streams reached")]
    MaxStreamsReached,

    #[error("Stream parameters not advertised: {0}")]
    UnsupportedStreamParameters(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Streaming delegate error: {0}")]
    StreamingDelegate(String),

    #[error("Failed to bind trigger listener: {0}")]
    ListenerBindFailed(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
