//! Walk through a handshake against the in-memory host.
//!
//! Run with:
//!   cargo run --example handshake

use std::rc::Rc;

use embedbridge::frame::MessageKind;
use embedbridge::transport::MemoryHost;
use embedbridge::{Session, SessionConfig};
use serde_json::json;

fn main() {
    let host = Rc::new(MemoryHost::new("https://host.example"));

    let session = Session::initialize(
        host.clone(),
        SessionConfig::new()
            .with_page_id("demo")
            .on_ready(|| eprintln!("host is ready"))
            .on_error(|err| eprintln!("delivery failed: {err}")),
    );
    session.on_command("refresh", |params| eprintln!("refresh requested: {params}"));

    // Queued: the host has not sent parent_ready yet.
    session.send_data(&json!({ "total": 42 }), None);
    session.send_message("Saved", MessageKind::Success);
    // Sent immediately.
    session.resize(360);

    host.deliver(json!({ "type": "parent_ready" }));
    host.deliver(json!({
        "type": "parent_command",
        "command": "refresh",
        "params": { "force": true },
    }));
    host.deliver(json!({ "type": "parent_command", "command": "unknown" }));

    for posted in host.posted() {
        println!("{} <- {}", posted.target, posted.message);
    }
}
