//! Message type tags.
//!
//! Tags prefixed `embed_` travel from the embedded page to its host;
//! tags prefixed `parent_` travel from the host to the page.

/// Page announces it is loaded and listening.
pub const EMBED_READY: &str = "embed_ready";

/// Application data for the host to display or consume.
pub const EMBED_DATA: &str = "embed_data";

/// Requested frame height.
pub const EMBED_RESIZE: &str = "embed_resize";

/// Page asks the host to dismiss it.
pub const EMBED_CLOSE: &str = "embed_close";

/// Host is listening; releases queued page data.
pub const PARENT_READY: &str = "parent_ready";

/// Named instruction from the host.
pub const PARENT_COMMAND: &str = "parent_command";

/// Which way a message type travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToHost,
    ToPage,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToHost => "to_host",
            Self::ToPage => "to_page",
        }
    }
}

/// Direction of a wire `type` tag, or `None` for unknown tags.
pub fn direction_of(tag: &str) -> Option<Direction> {
    match tag {
        EMBED_READY | EMBED_DATA | EMBED_RESIZE | EMBED_CLOSE => Some(Direction::ToHost),
        PARENT_READY | PARENT_COMMAND => Some(Direction::ToPage),
        _ => None,
    }
}
