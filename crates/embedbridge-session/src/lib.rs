//! Handshake, outbound queueing and command dispatch for an embedded page.
//!
//! This is the "just works" layer. Initialize a [`Session`] against a host
//! runtime, send data and UI hints to the host, and react to host commands.
//! Data sent before the host's `parent_ready` is queued and flushed in order
//! once the handshake completes; resize and close hints are never queued.

pub mod config;
pub mod error;
pub mod handshake;
pub mod origin;
pub mod registry;
pub mod session;

pub use config::{ErrorCallback, ReadyCallback, SessionConfig, SessionOptions};
pub use error::{BridgeError, Result};
pub use handshake::{Handshake, HandshakeState};
pub use origin::{resolve_origin, ResolvedOrigin};
pub use registry::{CommandHandler, CommandRegistry};
pub use session::{generate_page_id, Session, PAGE_ID_PREFIX};
