//! Host-runtime abstraction for cross-frame messaging.
//!
//! Provides the seam between the bridge and whatever actually carries
//! messages between an embedded page and its host:
//! - [`HostChannel`]: post to the host at an origin, subscribe to inbound events
//! - [`EmbeddingContext`]: top-level check, referrer, content size metrics
//!
//! This is the lowest layer of embedbridge. A browser implementation lives in
//! the `embedbridge-web` binding; [`MemoryHost`] is an in-process
//! implementation for tests and tooling.

pub mod error;
pub mod memory;
pub mod origin;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{MemoryHost, PostedMessage};
pub use origin::{origin_of, TargetOrigin, WILDCARD};
pub use traits::{
    ContentMetrics, EmbeddingContext, HostChannel, InboundEvent, InboundListener, SubscriptionId,
};
