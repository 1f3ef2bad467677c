use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::origin::TargetOrigin;

/// A message delivered by the host runtime, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Origin of the sending window, as reported by the runtime.
    pub origin: String,
    /// Untrusted payload. May be any JSON value, including non-objects.
    pub data: Value,
}

impl InboundEvent {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Callback registered with [`HostChannel::subscribe`].
///
/// Listeners run on the single event thread and may call back into the
/// channel (including `post_to_host`) while being invoked.
pub type InboundListener = Rc<dyn Fn(&InboundEvent)>;

/// Handle returned by [`HostChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Message-delivery mechanism between the embedded page and its host.
pub trait HostChannel {
    /// Register a listener for every message the runtime delivers, from any origin.
    fn subscribe(&self, listener: InboundListener) -> SubscriptionId;

    /// Remove a listener. Returns `false` if the id was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Post a message to the host window addressed to `target`.
    ///
    /// May fail synchronously, e.g. when the host's origin does not match.
    fn post_to_host(&self, message: &Value, target: &TargetOrigin) -> Result<()>;
}

/// Content size of the embedded document, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentMetrics {
    pub body_scroll_height: u32,
    pub root_scroll_height: u32,
}

impl ContentMetrics {
    /// Height the host should give the frame to show all content.
    pub fn content_height(&self) -> u32 {
        self.body_scroll_height.max(self.root_scroll_height)
    }
}

/// Facts about the document the bridge runs in.
pub trait EmbeddingContext {
    /// True when the page is not framed by any host.
    fn is_top_level(&self) -> bool;

    /// URL of the referring document, if the runtime exposes one.
    fn referrer(&self) -> Option<String>;

    fn content_metrics(&self) -> ContentMetrics;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_height_takes_larger_metric() {
        let metrics = ContentMetrics {
            body_scroll_height: 640,
            root_scroll_height: 720,
        };
        assert_eq!(metrics.content_height(), 720);

        let metrics = ContentMetrics {
            body_scroll_height: 900,
            root_scroll_height: 10,
        };
        assert_eq!(metrics.content_height(), 900);
    }
}
