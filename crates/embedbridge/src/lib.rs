//! Cross-frame messaging bridge for embedded pages.
//!
//! embedbridge lets a page running inside an iframe announce readiness,
//! queue data until its host completes a handshake, push resize and close
//! hints, and run named commands sent by the host.
//!
//! # Crate Structure
//!
//! - [`transport`]: Host-runtime seam (post to host, subscribe, document context)
//! - [`frame`]: Wire messages and inbound validation
//! - [`session`]: Handshake, outbound queueing, command dispatch (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use embedbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use embedbridge_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use embedbridge_session::*;
}

#[cfg(feature = "session")]
pub use embedbridge_session::{Session, SessionConfig, SessionOptions};
