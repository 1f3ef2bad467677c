use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Invoked once, after the handshake completes and queued data is flushed.
pub type ReadyCallback = Rc<dyn Fn()>;

/// Invoked for every message the host runtime failed to accept.
pub type ErrorCallback = Rc<dyn Fn(&BridgeError)>;

/// Serializable session options.
///
/// Field names follow the wire convention (`pageId`, `allowWildcard`, ...) so
/// the same JSON object can configure the browser binding and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Page identifier. Generated when absent or empty.
    pub page_id: Option<String>,
    /// Explicit host origin, used instead of the referrer.
    pub target_origin: Option<String>,
    /// Fall back to `*` when no trusted origin can be resolved.
    pub allow_wildcard: bool,
    /// Origins the session will address and accept messages from.
    /// Empty means unrestricted.
    pub allowed_origins: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_id: None,
            target_origin: None,
            allow_wildcard: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Options plus lifecycle callbacks.
#[derive(Clone, Default)]
pub struct SessionConfig {
    pub options: SessionOptions,
    pub on_ready: Option<ReadyCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.options.page_id = Some(page_id.into());
        self
    }

    pub fn with_target_origin(mut self, origin: impl Into<String>) -> Self {
        self.options.target_origin = Some(origin.into());
        self
    }

    /// Permit or refuse the `*` fallback.
    pub fn with_allow_wildcard(mut self, allow: bool) -> Self {
        self.options.allow_wildcard = allow;
        self
    }

    /// Restrict outbound addressing and inbound acceptance to these origins.
    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_ready(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_ready = Some(Rc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&BridgeError) + 'static) -> Self {
        self.on_error = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("options", &self.options)
            .field("on_ready", &self.on_ready.as_ref().map(|_| "<callback>"))
            .field("on_error", &self.on_error.as_ref().map(|_| "<callback>"))
            .finish()
    }
}
