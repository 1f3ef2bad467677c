use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use embedbridge_transport::{
    ContentMetrics, EmbeddingContext, HostChannel, InboundEvent, InboundListener, Result,
    SubscriptionId, TargetOrigin, TransportError,
};
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, Window};

use crate::convert::{js_to_json, json_to_js};
use crate::error::{describe, rejected};

type MessageClosure = Closure<dyn FnMut(MessageEvent)>;

/// Host runtime backed by the current browser window.
///
/// Posts go to `window.parent`; inbound traffic is the window's `message` event.
pub struct WindowHost {
    window: Window,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<u64, MessageClosure>>,
    // A listener may unsubscribe itself while the browser is still calling it,
    // so removed closures live as long as the host.
    retired: RefCell<Vec<MessageClosure>>,
}

impl WindowHost {
    /// `None` outside a window context (e.g. in a worker).
    pub fn new() -> Option<Self> {
        Some(Self {
            window: web_sys::window()?,
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
        })
    }

    fn parent(&self) -> Option<Window> {
        self.window.parent().ok().flatten()
    }
}

impl HostChannel for WindowHost {
    fn subscribe(&self, listener: InboundListener) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let closure = MessageClosure::new(move |event: MessageEvent| {
            let data = js_to_json(&event.data());
            listener(&InboundEvent::new(event.origin(), data));
        });
        if let Err(err) = self
            .window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            warn!(error = %describe(&err), "failed to attach message listener");
        }
        self.listeners.borrow_mut().insert(id, closure);
        SubscriptionId::new(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Some(closure) = self.listeners.borrow_mut().remove(&id.get()) else {
            return false;
        };
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            warn!(error = %describe(&err), "failed to detach message listener");
        }
        self.retired.borrow_mut().push(closure);
        true
    }

    fn post_to_host(&self, message: &Value, target: &TargetOrigin) -> Result<()> {
        let parent = self.parent().ok_or(TransportError::NoHost)?;
        let payload = json_to_js(message).map_err(rejected)?;
        parent
            .post_message(&payload, target.as_str())
            .map_err(rejected)
    }
}

impl EmbeddingContext for WindowHost {
    fn is_top_level(&self) -> bool {
        match self.parent() {
            Some(parent) => js_sys::Object::is(&parent, &self.window),
            None => true,
        }
    }

    fn referrer(&self) -> Option<String> {
        self.window
            .document()
            .map(|document| document.referrer())
            .filter(|referrer| !referrer.is_empty())
    }

    fn content_metrics(&self) -> ContentMetrics {
        let Some(document) = self.window.document() else {
            return ContentMetrics::default();
        };
        let height = |value: i32| u32::try_from(value).unwrap_or(0);
        ContentMetrics {
            body_scroll_height: document
                .body()
                .map(|body| height(body.scroll_height()))
                .unwrap_or(0),
            root_scroll_height: document
                .document_element()
                .map(|root| height(root.scroll_height()))
                .unwrap_or(0),
        }
    }
}

impl Drop for WindowHost {
    fn drop(&mut self) {
        for (_, closure) in self.listeners.get_mut().drain() {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                warn!(error = %describe(&err), "failed to detach message listener");
            }
        }
    }
}
