//! Browser binding for embedbridge.
//!
//! [`WindowHost`] implements the transport traits over `window.parent.postMessage`
//! and the window `message` event; [`EmbedBridge`] exposes a session to JavaScript.

mod bridge;
mod convert;
mod error;
mod host;

pub use bridge::EmbedBridge;
pub use host::WindowHost;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_name = embedReady)]
pub fn embed_ready() -> String {
    embedbridge_frame::EMBED_READY.to_string()
}

#[wasm_bindgen(js_name = parentReady)]
pub fn parent_ready() -> String {
    embedbridge_frame::PARENT_READY.to_string()
}

#[wasm_bindgen(js_name = parentCommand)]
pub fn parent_command() -> String {
    embedbridge_frame::PARENT_COMMAND.to_string()
}
