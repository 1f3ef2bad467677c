use std::fs;

use embedbridge_frame::{direction_of, Direction, FrameError, InboundMessage};
use serde_json::Value;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, json_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_decode_report, DecodeReport, OutputFormat};

/// Exit with `DATA_INVALID` when the dispatcher would drop the message.
pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(&args)?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|err| json_error("input is not valid JSON", err))?;

    let report = classify(&value);
    print_decode_report(&report, format);
    Ok(if report.accepted { SUCCESS } else { DATA_INVALID })
}

fn read_input(args: &DecodeArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(
        crate::exit::USAGE,
        "provide a JSON message or --file",
    ))
}

pub(crate) fn classify(value: &Value) -> DecodeReport {
    match InboundMessage::parse(value) {
        Ok(InboundMessage::ParentReady) => DecodeReport {
            accepted: true,
            kind: Some(embedbridge_frame::PARENT_READY.to_string()),
            direction: Some(Direction::ToPage.as_str()),
            command: None,
            params: None,
            reason: None,
        },
        Ok(InboundMessage::ParentCommand { command, params }) => DecodeReport {
            accepted: true,
            kind: Some(embedbridge_frame::PARENT_COMMAND.to_string()),
            direction: Some(Direction::ToPage.as_str()),
            command: Some(command),
            params: Some(params),
            reason: None,
        },
        Err(err) => {
            let kind = match &err {
                FrameError::UnknownType(tag) => Some(tag.clone()),
                _ => None,
            };
            DecodeReport {
                accepted: false,
                direction: kind.as_deref().and_then(direction_of).map(Direction::as_str),
                kind,
                command: None,
                params: None,
                reason: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_parent_command() {
        let report = classify(&json!({"type": "parent_command", "command": "reset", "params": {}}));
        assert!(report.accepted);
        assert_eq!(report.kind.as_deref(), Some("parent_command"));
        assert_eq!(report.direction, Some("to_page"));
        assert_eq!(report.command.as_deref(), Some("reset"));
        assert_eq!(report.params, Some(json!({})));
    }

    #[test]
    fn reports_unknown_type() {
        let report = classify(&json!({"type": "embed_ready"}));
        assert!(!report.accepted);
        assert_eq!(report.kind.as_deref(), Some("embed_ready"));
        assert_eq!(report.direction, Some("to_host"));
        assert!(report.reason.unwrap().contains("unknown message type"));
    }

    #[test]
    fn rejects_non_object() {
        let report = classify(&json!("parent_ready"));
        assert!(!report.accepted);
        assert!(report.kind.is_none());
        assert!(report.direction.is_none());
    }
}
