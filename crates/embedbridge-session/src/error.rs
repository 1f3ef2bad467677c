/// Errors reported through a session's `on_error` callback.
///
/// Nothing in the public session API returns these; delivery failures are
/// logged and handed to the callback instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The host runtime refused the message.
    #[error("transport error: {0}")]
    Transport(#[from] embedbridge_transport::TransportError),

    /// The message could not be encoded.
    #[error("frame error: {0}")]
    Frame(#[from] embedbridge_frame::FrameError),

    /// No trusted origin was resolved and wildcard delivery is disabled.
    #[error("no trusted host origin (wildcard delivery disabled)")]
    OriginUnresolved,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
