use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use embedbridge_frame::{
    DisplayOptions, FrameError, InboundMessage, MessageKind, OutboundMessage, TextMessage,
};
use embedbridge_transport::{
    EmbeddingContext, HostChannel, InboundEvent, SubscriptionId, TargetOrigin,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::config::{ErrorCallback, ReadyCallback, SessionConfig};
use crate::error::BridgeError;
use crate::handshake::{Handshake, HandshakeState};
use crate::origin::{is_allowed, resolve_origin, ResolvedOrigin};
use crate::registry::{typed_handler, CommandHandler, CommandRegistry};

/// Prefix of generated page identifiers.
pub const PAGE_ID_PREFIX: &str = "embed_";

static NEXT_PAGE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Generate a page id: prefix, millisecond timestamp, process-wide sequence.
pub fn generate_page_id() -> String {
    let seq = NEXT_PAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "{PAGE_ID_PREFIX}{}_{seq}",
        chrono::Utc::now().timestamp_millis()
    )
}

/// Bridge between an embedded page and its host.
///
/// Cheap to clone; all clones share one session. A session is bound to the
/// single event thread of its host runtime and is neither `Send` nor `Sync`.
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    page_id: String,
    channel: Rc<dyn HostChannel>,
    context: Rc<dyn EmbeddingContext>,
    origin: ResolvedOrigin,
    allowed_origins: Vec<String>,
    on_ready: Option<ReadyCallback>,
    on_error: Option<ErrorCallback>,
    state: RefCell<SessionState>,
}

struct SessionState {
    handshake: Handshake,
    handlers: CommandRegistry,
    subscription: Option<SubscriptionId>,
}

impl Session {
    /// Initialize against a host runtime that is both channel and document context.
    pub fn initialize<H>(host: Rc<H>, config: SessionConfig) -> Self
    where
        H: HostChannel + EmbeddingContext + 'static,
    {
        Self::initialize_with(host.clone(), host, config)
    }

    /// Initialize against a separate channel and document context.
    ///
    /// Resolves the host origin, subscribes to inbound messages and queues an
    /// `embed_ready` notification for the handshake.
    pub fn initialize_with(
        channel: Rc<dyn HostChannel>,
        context: Rc<dyn EmbeddingContext>,
        config: SessionConfig,
    ) -> Self {
        let SessionConfig {
            options,
            on_ready,
            on_error,
        } = config;

        let page_id = options
            .page_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_page_id);
        let origin = resolve_origin(context.as_ref(), &options);

        let inner = Rc::new(SessionInner {
            page_id,
            channel,
            context,
            origin,
            allowed_origins: options.allowed_origins,
            on_ready,
            on_error,
            state: RefCell::new(SessionState {
                handshake: Handshake::new(),
                handlers: CommandRegistry::new(),
                subscription: None,
            }),
        });

        let weak: Weak<SessionInner> = Rc::downgrade(&inner);
        let subscription = inner.channel.subscribe(Rc::new(move |event: &InboundEvent| {
            if let Some(inner) = weak.upgrade() {
                Session { inner }.handle_inbound(event);
            }
        }));
        inner.state.borrow_mut().subscription = Some(subscription);

        let session = Session { inner };
        info!(
            page_id = %session.inner.page_id,
            origin = ?session.inner.origin,
            "bridge session initialized"
        );
        session.enqueue_or_send(OutboundMessage::ready(session.page_id()));
        session
    }

    pub fn page_id(&self) -> &str {
        &self.inner.page_id
    }

    /// True once the host has sent `parent_ready`.
    pub fn is_ready(&self) -> bool {
        self.inner.state.borrow().handshake.is_ready()
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.inner.state.borrow().handshake.state()
    }

    /// Number of messages waiting for the handshake.
    pub fn pending_len(&self) -> usize {
        self.inner.state.borrow().handshake.pending_len()
    }

    pub fn origin(&self) -> &ResolvedOrigin {
        &self.inner.origin
    }

    /// Origin outbound messages are addressed to, if one was resolved.
    pub fn target_origin(&self) -> Option<&TargetOrigin> {
        self.inner.origin.target()
    }

    /// False when the page runs top-level and every send is a no-op.
    pub fn is_embedded(&self) -> bool {
        self.inner.origin != ResolvedOrigin::NoHost
    }

    /// Current inbound subscription; `None` after [`Session::teardown`].
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.inner.state.borrow().subscription
    }

    /// Send application data to the host.
    ///
    /// Queued until the handshake completes, then delivered in call order.
    pub fn send_data<T>(&self, data: &T, options: Option<DisplayOptions>)
    where
        T: Serialize + ?Sized,
    {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(err) => {
                self.report(
                    embedbridge_frame::EMBED_DATA,
                    FrameError::Json(err).into(),
                );
                return;
            }
        };
        self.enqueue_or_send(OutboundMessage::data(
            self.page_id(),
            data,
            options.unwrap_or_default(),
        ));
    }

    /// Send a text message for the host to display. Queued like [`Session::send_data`].
    pub fn send_message(&self, text: &str, kind: MessageKind) {
        self.send_data(&TextMessage::new(text, kind), None);
    }

    /// Ask the host to resize the frame. Never queued.
    pub fn resize(&self, height: u32) {
        self.transmit(OutboundMessage::resize(self.page_id(), height));
    }

    /// Resize to the document's current content height and return that height.
    pub fn auto_resize(&self) -> u32 {
        let height = self.inner.context.content_metrics().content_height();
        self.resize(height);
        height
    }

    /// Ask the host to dismiss the frame. Never queued.
    pub fn close(&self) {
        self.transmit(OutboundMessage::close(self.page_id()));
    }

    /// Register the handler for `command`, replacing any earlier one.
    pub fn on_command<F>(&self, command: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&Value) + 'static,
    {
        self.register(command.into(), Rc::new(handler))
    }

    /// Register a handler whose params are decoded into `T` first.
    pub fn on_command_typed<T, F>(&self, command: impl Into<String>, handler: F) -> &Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + 'static,
    {
        let command = command.into();
        let handler = typed_handler(&command, handler);
        self.register(command, handler)
    }

    pub fn has_handler(&self, command: &str) -> bool {
        self.inner.state.borrow().handlers.contains(command)
    }

    /// Stop receiving host messages. Returns `false` if already torn down.
    ///
    /// Sends keep working; only the inbound subscription is released.
    pub fn teardown(&self) -> bool {
        let subscription = self.inner.state.borrow_mut().subscription.take();
        match subscription {
            Some(id) => {
                self.inner.channel.unsubscribe(id);
                debug!(page_id = %self.inner.page_id, "bridge session torn down");
                true
            }
            None => false,
        }
    }

    fn register(&self, command: String, handler: CommandHandler) -> &Self {
        let replaced = self
            .inner
            .state
            .borrow_mut()
            .handlers
            .register(command.clone(), handler);
        if replaced.is_some() {
            debug!(%command, "replaced command handler");
        }
        self
    }

    fn enqueue_or_send(&self, message: OutboundMessage) {
        let ready = self.inner.state.borrow_mut().handshake.admit(message);
        if let Some(message) = ready {
            self.transmit(message);
        }
    }

    fn transmit(&self, message: OutboundMessage) {
        let kind = message.kind();
        let target = match &self.inner.origin {
            ResolvedOrigin::NoHost => {
                trace!(kind, "no embedding host; message dropped");
                return;
            }
            ResolvedOrigin::Unresolved => {
                self.report(kind, BridgeError::OriginUnresolved);
                return;
            }
            ResolvedOrigin::Target(target) => target,
        };

        let result = message
            .to_value()
            .map_err(BridgeError::from)
            .and_then(|value| {
                self.inner
                    .channel
                    .post_to_host(&value, target)
                    .map_err(BridgeError::from)
            });

        match result {
            Ok(()) => debug!(kind, %target, "posted to host"),
            Err(err) => self.report(kind, err),
        }
    }

    fn report(&self, kind: &str, err: BridgeError) {
        error!(
            page_id = %self.inner.page_id,
            kind,
            error = %err,
            "failed to deliver message to host"
        );
        if let Some(on_error) = self.inner.on_error.clone() {
            on_error(&err);
        }
    }

    fn handle_inbound(&self, event: &InboundEvent) {
        if !is_allowed(&self.inner.allowed_origins, &event.origin) {
            debug!(origin = %event.origin, "dropped message from origin outside allowlist");
            return;
        }

        let message = match InboundMessage::parse(&event.data) {
            Ok(message) => message,
            Err(err) => {
                trace!(error = %err, "ignored malformed inbound message");
                return;
            }
        };

        match message {
            InboundMessage::ParentReady => self.complete_handshake(),
            InboundMessage::ParentCommand { command, params } => {
                self.run_command(&command, &params)
            }
        }
    }

    fn complete_handshake(&self) {
        let (started, queued) = {
            let mut state = self.inner.state.borrow_mut();
            (state.handshake.begin(), state.handshake.pending_len())
        };
        if !started {
            trace!("host already ready; parent_ready ignored");
            return;
        }

        info!(
            page_id = %self.inner.page_id,
            queued,
            "host ready; flushing queued messages"
        );
        // Callbacks may send while this runs; their data joins the queue tail.
        loop {
            let next = self.inner.state.borrow_mut().handshake.next_pending();
            match next {
                Some(message) => self.transmit(message),
                None => break,
            }
        }

        if let Some(on_ready) = self.inner.on_ready.clone() {
            on_ready();
        }
    }

    fn run_command(&self, command: &str, params: &Value) {
        let handler = self.inner.state.borrow().handlers.get(command);
        match handler {
            Some(handler) => {
                debug!(command, "dispatching host command");
                handler(params);
            }
            None => warn!(command, "no handler registered for host command"),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Session")
            .field("page_id", &self.inner.page_id)
            .field("origin", &self.inner.origin)
            .field("handshake", &state.handshake.state())
            .field("pending", &state.handshake.pending_len())
            .field("handlers", &state.handlers)
            .finish()
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().subscription.take() {
            self.channel.unsubscribe(id);
        }
    }
}
