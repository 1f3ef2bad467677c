/// Errors that can occur while handing a message to the host runtime.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host's origin does not match the addressed target origin.
    #[error("target origin {target} does not match host origin {actual}")]
    OriginMismatch { target: String, actual: String },

    /// The page is not embedded; there is no host to deliver to.
    #[error("no embedding host")]
    NoHost,

    /// The host runtime refused or failed to deliver the message.
    #[error("host rejected message: {0}")]
    Rejected(String),

    /// The transport has been shut down.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
