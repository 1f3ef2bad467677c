use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use embedbridge_frame::{DisplayOptions, MessageKind};
use embedbridge_session::{Session, SessionConfig, SessionOptions};
use embedbridge_transport::{ContentMetrics, MemoryHost, TargetOrigin};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cmd::ReplayArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{print_replay, OutputFormat, ReplayEvent};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    SendData {
        data: Value,
        #[serde(default)]
        options: Option<DisplayOptions>,
    },
    SendMessage {
        text: String,
        #[serde(default)]
        kind: MessageKind,
    },
    Resize {
        height: u32,
    },
    AutoResize,
    /// Change the simulated document's scroll heights.
    Metrics {
        body: u32,
        root: u32,
    },
    Close,
    /// Host → page message; `origin` defaults to the host origin.
    Deliver {
        message: Value,
        #[serde(default)]
        origin: Option<String>,
    },
    /// Register a command handler that records its params and optionally replies with data.
    Register {
        command: String,
        #[serde(default)]
        reply: Option<Value>,
    },
    /// Make the host refuse the next post.
    FailNext {
        reason: String,
    },
    /// Detach the simulated host window.
    HostGone,
    Teardown,
}

/// Exits with `FAILURE` when the session reported any delivery error.
pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let script = fs::read_to_string(&args.script)
        .map_err(|err| io_error(&format!("failed reading {}", args.script.display()), err))?;
    let steps = parse_script(&script)?;
    let options = load_options(args.config.as_deref(), args.page_id.as_deref())?;
    let host = Rc::new(build_host(&args));

    let events = replay(host, options, &steps);
    print_replay(&events, format);

    if events.iter().any(|event| event.event == "error") {
        Ok(FAILURE)
    } else {
        Ok(SUCCESS)
    }
}

/// Parse a JSON-lines script into `(line number, step)` pairs.
fn parse_script(script: &str) -> CliResult<Vec<(usize, Step)>> {
    let mut steps = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(line).map_err(|err| {
            CliError::new(DATA_INVALID, format!("script line {}: {err}", index + 1))
        })?;
        steps.push((index + 1, step));
    }
    Ok(steps)
}

fn load_options(config: Option<&Path>, page_id: Option<&str>) -> CliResult<SessionOptions> {
    let mut options = match config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            serde_json::from_str(&raw).map_err(|err| {
                CliError::new(DATA_INVALID, format!("invalid config {}: {err}", path.display()))
            })?
        }
        None => SessionOptions::default(),
    };
    if let Some(page_id) = page_id {
        options.page_id = Some(page_id.to_string());
    }
    Ok(options)
}

fn build_host(args: &ReplayArgs) -> MemoryHost {
    if args.top_level {
        return MemoryHost::top_level();
    }
    let host = MemoryHost::new(args.host_origin.clone());
    if args.no_referrer {
        host.with_referrer(None)
    } else if let Some(referrer) = &args.referrer {
        host.with_referrer(Some(referrer))
    } else {
        host
    }
}

/// Records session effects against the step that caused them.
///
/// Posts are drained from the host before every callback event so the log
/// keeps the order in which things happened.
#[derive(Clone)]
struct Recorder {
    host: Rc<MemoryHost>,
    step: Rc<Cell<usize>>,
    events: Rc<RefCell<Vec<ReplayEvent>>>,
}

impl Recorder {
    fn new(host: Rc<MemoryHost>) -> Self {
        Self {
            host,
            step: Rc::new(Cell::new(0)),
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn record(&self, event: &'static str, detail: Value) {
        self.flush_posted();
        self.push(event, detail);
    }

    fn flush_posted(&self) {
        for posted in self.host.take_posted() {
            self.push(
                "posted",
                json!({ "target": posted.target.to_string(), "message": posted.message }),
            );
        }
    }

    fn push(&self, event: &'static str, detail: Value) {
        self.events.borrow_mut().push(ReplayEvent {
            step: self.step.get(),
            event,
            detail,
        });
    }

    fn finish(self) -> Vec<ReplayEvent> {
        self.flush_posted();
        self.events.take()
    }
}

fn replay(
    host: Rc<MemoryHost>,
    options: SessionOptions,
    steps: &[(usize, Step)],
) -> Vec<ReplayEvent> {
    let recorder = Recorder::new(host.clone());
    let replies: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));

    let on_ready = recorder.clone();
    let on_error = recorder.clone();
    let config = SessionConfig::from_options(options)
        .on_ready(move || on_ready.record("ready", Value::Null))
        .on_error(move |err| on_error.record("error", json!({ "error": err.to_string() })));
    let session = Session::initialize(host.clone(), config);
    recorder.record(
        "initialized",
        json!({
            "pageId": session.page_id(),
            "embedded": session.is_embedded(),
            "target": session.target_origin().map(ToString::to_string),
            "wildcard": session.target_origin().is_some_and(TargetOrigin::is_wildcard),
        }),
    );

    for (line, step) in steps {
        recorder.flush_posted();
        recorder.step.set(*line);
        debug!(line, ?step, "replaying step");
        run_step(&session, &host, &recorder, &replies, step);

        let pending: Vec<Value> = replies.borrow_mut().drain(..).collect();
        for reply in pending {
            session.send_data(&reply, None);
        }
    }

    recorder.finish()
}

fn run_step(
    session: &Session,
    host: &MemoryHost,
    recorder: &Recorder,
    replies: &Rc<RefCell<Vec<Value>>>,
    step: &Step,
) {
    match step {
        Step::SendData { data, options } => session.send_data(data, options.clone()),
        Step::SendMessage { text, kind } => session.send_message(text, *kind),
        Step::Resize { height } => session.resize(*height),
        Step::AutoResize => {
            let height = session.auto_resize();
            recorder.record("measured", json!({ "height": height }));
        }
        Step::Metrics { body, root } => host.set_content_metrics(ContentMetrics {
            body_scroll_height: *body,
            root_scroll_height: *root,
        }),
        Step::Close => session.close(),
        Step::Deliver { message, origin } => {
            let origin = origin.clone().unwrap_or_else(|| host.host_origin());
            let listeners = host.deliver_from(origin.clone(), message.clone());
            if listeners == 0 {
                recorder.record("unheard", json!({ "origin": origin }));
            }
        }
        Step::Register { command, reply } => {
            let name = command.clone();
            let recorder = recorder.clone();
            let replies = Rc::clone(replies);
            let reply = reply.clone();
            session.on_command(command.clone(), move |params| {
                recorder.record("command", json!({ "command": name, "params": params }));
                if let Some(reply) = &reply {
                    replies.borrow_mut().push(reply.clone());
                }
            });
        }
        Step::FailNext { reason } => host.fail_next_post(reason.clone()),
        Step::HostGone => host.close(),
        Step::Teardown => {
            let released = session.teardown();
            recorder.record("teardown", json!({ "released": released }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://host.example";

    fn run_script(script: &str) -> Vec<ReplayEvent> {
        let steps = parse_script(script).unwrap();
        let options = SessionOptions {
            page_id: Some("p1".to_string()),
            ..SessionOptions::default()
        };
        replay(Rc::new(MemoryHost::new(HOST)), options, &steps)
    }

    fn posted_types(events: &[ReplayEvent]) -> Vec<String> {
        events
            .iter()
            .filter(|event| event.event == "posted")
            .map(|event| event.detail["message"]["type"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn parses_steps_and_skips_comments() {
        let steps = parse_script(
            "# warm up\n\n{\"op\":\"resize\",\"height\":120}\n{\"op\":\"teardown\"}\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![(3, Step::Resize { height: 120 }), (4, Step::Teardown)]
        );
    }

    #[test]
    fn bad_line_reports_line_number() {
        let err = parse_script("{\"op\":\"close\"}\n{\"op\":\"explode\"}").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("script line 2"));
    }

    #[test]
    fn queued_data_is_posted_after_handshake() {
        let events = run_script(
            r#"{"op":"send_data","data":{"n":1}}
{"op":"resize","height":300}
{"op":"deliver","message":{"type":"parent_ready"}}"#,
        );

        assert_eq!(
            posted_types(&events),
            vec!["embed_resize", "embed_ready", "embed_data"]
        );
        let ready = events.iter().position(|event| event.event == "ready").unwrap();
        let last_post = events.iter().rposition(|event| event.event == "posted").unwrap();
        assert!(last_post < ready);
        assert!(events.iter().all(|event| event.event != "error"));
        assert_eq!(events[0].detail["wildcard"], json!(false));
    }

    #[test]
    fn command_reply_is_sent_after_dispatch() {
        let events = run_script(
            r#"{"op":"deliver","message":{"type":"parent_ready"}}
{"op":"register","command":"ping","reply":{"pong":true}}
{"op":"deliver","message":{"type":"parent_command","command":"ping","params":{"seq":4}}}"#,
        );

        let command = events.iter().find(|event| event.event == "command").unwrap();
        assert_eq!(command.step, 3);
        assert_eq!(command.detail["params"], json!({"seq": 4}));

        let reply = events.last().unwrap();
        assert_eq!(reply.event, "posted");
        assert_eq!(reply.detail["message"]["data"], json!({"pong": true}));
    }

    #[test]
    fn injected_failure_is_recorded_as_error() {
        let events = run_script(
            r#"{"op":"fail_next","reason":"frame detached"}
{"op":"close"}"#,
        );
        let error = events.iter().find(|event| event.event == "error").unwrap();
        assert_eq!(error.step, 2);
        assert!(error.detail["error"]
            .as_str()
            .unwrap()
            .contains("frame detached"));
    }

    #[test]
    fn teardown_stops_inbound_delivery() {
        let events = run_script(
            r#"{"op":"teardown"}
{"op":"deliver","message":{"type":"parent_ready"}}"#,
        );
        assert!(events
            .iter()
            .any(|event| event.event == "teardown" && event.detail["released"] == json!(true)));
        assert!(events.iter().any(|event| event.event == "unheard"));
        assert!(events.iter().all(|event| event.event != "ready"));
    }
}
