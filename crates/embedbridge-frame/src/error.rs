/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Payload could not be converted to or from JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The message is not shaped like a bridge message.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The `type` field names no message this side understands.
    #[error("unknown message type '{0}'")]
    UnknownType(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
