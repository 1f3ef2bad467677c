use embedbridge_frame::{DisplayOptions, OutboundMessage, TextMessage};
use embedbridge_session::generate_page_id;
use serde_json::Value;

use crate::cmd::{EncodeArgs, EncodeKind};
use crate::exit::{frame_error, json_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_wire_message, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message = build_message(&args)?;
    let value = message
        .to_value()
        .map_err(|err| frame_error("encode failed", err))?;
    print_wire_message(&value, format);
    Ok(SUCCESS)
}

fn build_message(args: &EncodeArgs) -> CliResult<OutboundMessage> {
    let page_id = args.page_id.clone().unwrap_or_else(generate_page_id);

    match args.kind {
        EncodeKind::Ready => Ok(OutboundMessage::ready(page_id)),
        EncodeKind::Data => {
            let json = args
                .json
                .as_deref()
                .ok_or_else(|| CliError::new(USAGE, "data requires --json"))?;
            let data: Value = serde_json::from_str(json)
                .map_err(|err| json_error("--json is not valid JSON", err))?;
            let options = parse_options(args.options.as_deref())?;
            Ok(OutboundMessage::data(page_id, data, options))
        }
        EncodeKind::Message => {
            let text = args
                .text
                .as_deref()
                .ok_or_else(|| CliError::new(USAGE, "message requires --text"))?;
            let data = serde_json::to_value(TextMessage::new(text, args.message_type))
                .map_err(|err| json_error("encode failed", err))?;
            Ok(OutboundMessage::data(page_id, data, DisplayOptions::new()))
        }
        EncodeKind::Resize => {
            let height = args
                .height
                .ok_or_else(|| CliError::new(USAGE, "resize requires --height"))?;
            Ok(OutboundMessage::resize(page_id, height))
        }
        EncodeKind::Close => Ok(OutboundMessage::close(page_id)),
    }
}

fn parse_options(input: Option<&str>) -> CliResult<DisplayOptions> {
    let Some(input) = input else {
        return Ok(DisplayOptions::new());
    };
    match serde_json::from_str::<Value>(input)
        .map_err(|err| json_error("--options is not valid JSON", err))?
    {
        Value::Object(options) => Ok(options),
        _ => Err(CliError::new(USAGE, "--options must be a JSON object")),
    }
}
