use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::origin::TargetOrigin;
use crate::traits::{
    ContentMetrics, EmbeddingContext, HostChannel, InboundEvent, InboundListener, SubscriptionId,
};

/// A message accepted by [`MemoryHost::post_to_host`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target: TargetOrigin,
    pub message: Value,
}

/// In-process host runtime.
///
/// Plays both the host window (records everything posted to it, rejects
/// mismatched target origins) and the embedded document (top-level flag,
/// referrer, content metrics). Inbound traffic is injected with
/// [`MemoryHost::deliver`].
pub struct MemoryHost {
    state: RefCell<MemoryHostState>,
}

struct MemoryHostState {
    host_origin: String,
    top_level: bool,
    referrer: Option<String>,
    metrics: ContentMetrics,
    listeners: Vec<(SubscriptionId, InboundListener)>,
    next_subscription: u64,
    posted: Vec<PostedMessage>,
    pending_failures: VecDeque<String>,
    closed: bool,
}

impl MemoryHost {
    /// Embedded page framed by a host at `host_origin`.
    ///
    /// The referrer defaults to a page on the host origin.
    pub fn new(host_origin: impl Into<String>) -> Self {
        let host_origin = host_origin.into();
        let referrer = Some(format!("{host_origin}/"));
        Self::with_state(host_origin, false, referrer)
    }

    /// Page loaded directly, with no embedding host.
    pub fn top_level() -> Self {
        Self::with_state(String::new(), true, None)
    }

    fn with_state(host_origin: String, top_level: bool, referrer: Option<String>) -> Self {
        Self {
            state: RefCell::new(MemoryHostState {
                host_origin,
                top_level,
                referrer,
                metrics: ContentMetrics::default(),
                listeners: Vec::new(),
                next_subscription: 1,
                posted: Vec::new(),
                pending_failures: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Override the referrer the document reports (`None` hides it).
    pub fn with_referrer(self, referrer: Option<&str>) -> Self {
        self.state.borrow_mut().referrer = referrer.map(str::to_string);
        self
    }

    /// Override the document's content metrics.
    pub fn with_content_metrics(self, metrics: ContentMetrics) -> Self {
        self.state.borrow_mut().metrics = metrics;
        self
    }

    pub fn set_content_metrics(&self, metrics: ContentMetrics) {
        self.state.borrow_mut().metrics = metrics;
    }

    /// Origin of the simulated host window.
    pub fn host_origin(&self) -> String {
        self.state.borrow().host_origin.clone()
    }

    /// Deliver a message from the host window to every subscribed listener.
    ///
    /// Returns the number of listeners invoked.
    pub fn deliver(&self, data: Value) -> usize {
        let origin = self.host_origin();
        self.deliver_from(origin, data)
    }

    /// Deliver a message that claims to come from `origin`.
    pub fn deliver_from(&self, origin: impl Into<String>, data: Value) -> usize {
        let event = InboundEvent::new(origin, data);
        // Listeners may post or (un)subscribe re-entrantly.
        let listeners: Vec<InboundListener> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Make the next post fail with [`TransportError::Rejected`].
    pub fn fail_next_post(&self, reason: impl Into<String>) {
        self.state
            .borrow_mut()
            .pending_failures
            .push_back(reason.into());
    }

    /// Refuse every later post with [`TransportError::Closed`].
    pub fn close(&self) {
        self.state.borrow_mut().closed = true;
    }

    /// Everything accepted so far, in delivery order.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.state.borrow().posted.clone()
    }

    /// Payloads accepted so far, in delivery order.
    pub fn posted_messages(&self) -> Vec<Value> {
        self.state
            .borrow()
            .posted
            .iter()
            .map(|posted| posted.message.clone())
            .collect()
    }

    /// Drain and return everything accepted so far.
    pub fn take_posted(&self) -> Vec<PostedMessage> {
        std::mem::take(&mut self.state.borrow_mut().posted)
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl HostChannel for MemoryHost {
    fn subscribe(&self, listener: InboundListener) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId::new(state.next_subscription);
        state.next_subscription += 1;
        state.listeners.push((id, listener));
        debug!(subscription = id.get(), "listener subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _)| *existing != id);
        let removed = state.listeners.len() != before;
        if removed {
            debug!(subscription = id.get(), "listener unsubscribed");
        }
        removed
    }

    fn post_to_host(&self, message: &Value, target: &TargetOrigin) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.top_level {
            return Err(TransportError::NoHost);
        }
        if state.closed {
            return Err(TransportError::Closed);
        }
        if let Some(reason) = state.pending_failures.pop_front() {
            return Err(TransportError::Rejected(reason));
        }
        if !target.permits(&state.host_origin) {
            return Err(TransportError::OriginMismatch {
                target: target.to_string(),
                actual: state.host_origin.clone(),
            });
        }

        state.posted.push(PostedMessage {
            target: target.clone(),
            message: message.clone(),
        });
        Ok(())
    }
}

impl EmbeddingContext for MemoryHost {
    fn is_top_level(&self) -> bool {
        self.state.borrow().top_level
    }

    fn referrer(&self) -> Option<String> {
        self.state.borrow().referrer.clone()
    }

    fn content_metrics(&self) -> ContentMetrics {
        self.state.borrow().metrics
    }
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryHost")
            .field("host_origin", &state.host_origin)
            .field("top_level", &state.top_level)
            .field("listeners", &state.listeners.len())
            .field("posted", &state.posted.len())
            .finish()
    }
}
