//! Wire messages exchanged between an embedded page and its host.
//!
//! Every message is a JSON object discriminated by its `type` field:
//! - outbound (page → host): `embed_ready`, `embed_data`, `embed_resize`, `embed_close`
//! - inbound (host → page): `parent_ready`, `parent_command`
//!
//! Inbound traffic is untrusted; [`InboundMessage::parse`] performs the only
//! validation the bridge does (object shape, known `type`, string `command`).

pub mod codec;
pub mod error;
pub mod kind;

pub use codec::{
    timestamp_now, DisplayOptions, InboundMessage, MessageKind, OutboundMessage, TextMessage,
};
pub use error::{FrameError, Result};
pub use kind::{
    direction_of, Direction, EMBED_CLOSE, EMBED_DATA, EMBED_READY, EMBED_RESIZE,
    PARENT_COMMAND, PARENT_READY,
};
