use std::collections::VecDeque;

use embedbridge_frame::OutboundMessage;
use tracing::debug;

/// Readiness of the host, as seen by the embedded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// No `parent_ready` yet; data is queued.
    AwaitingHandshake,
    /// Host signalled ready; the queue is being flushed and new data joins its tail.
    Draining,
    /// Queue flushed; data is sent directly. Terminal.
    Active,
}

/// Handshake state machine and the data queue it gates.
#[derive(Debug)]
pub struct Handshake {
    state: HandshakeState,
    pending: VecDeque<OutboundMessage>,
}

impl Handshake {
    pub fn new() -> Self {
        Self {
            state: HandshakeState::AwaitingHandshake,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// True once `parent_ready` has been seen, including while draining.
    pub fn is_ready(&self) -> bool {
        self.state != HandshakeState::AwaitingHandshake
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queue `message` while awaiting the handshake; hand it back once active.
    pub fn admit(&mut self, message: OutboundMessage) -> Option<OutboundMessage> {
        match self.state {
            HandshakeState::Active => Some(message),
            HandshakeState::AwaitingHandshake | HandshakeState::Draining => {
                debug!(
                    kind = message.kind(),
                    depth = self.pending.len() + 1,
                    "queued until host is ready"
                );
                self.pending.push_back(message);
                None
            }
        }
    }

    /// Start draining. Returns `false` if `parent_ready` was already seen.
    pub fn begin(&mut self) -> bool {
        match self.state {
            HandshakeState::AwaitingHandshake => {
                self.state = HandshakeState::Draining;
                true
            }
            HandshakeState::Draining | HandshakeState::Active => false,
        }
    }

    /// Next message to flush, in FIFO order.
    ///
    /// Returns `None` and becomes [`HandshakeState::Active`] once the queue is
    /// empty. Messages admitted between calls are flushed by later calls.
    pub fn next_pending(&mut self) -> Option<OutboundMessage> {
        if self.state != HandshakeState::Draining {
            return None;
        }
        let next = self.pending.pop_front();
        if next.is_none() {
            self.state = HandshakeState::Active;
        }
        next
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}
