use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

const PREVIEW_LIMIT: usize = 96;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Result of validating one inbound message.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub accepted: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `to_page` or `to_host` for known tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One observable effect of a replayed step.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayEvent {
    pub step: usize,
    pub event: &'static str,
    pub detail: Value,
}

pub fn print_wire_message(message: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json_line(message)),
        OutputFormat::Pretty => println!("{}", to_json_pretty(message)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            if let Some(object) = message.as_object() {
                for (field, value) in object {
                    table.add_row(vec![field.clone(), preview(value)]);
                }
            }
            println!("{table}");
        }
    }
}

pub fn print_decode_report(report: &DecodeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json_line(report)),
        OutputFormat::Pretty => println!("{}", to_json_pretty(report)),
        OutputFormat::Table => {
            let mut table = new_table(vec![
                "ACCEPTED",
                "TYPE",
                "DIRECTION",
                "COMMAND",
                "PARAMS",
                "REASON",
            ]);
            table.add_row(vec![
                report.accepted.to_string(),
                report.kind.clone().unwrap_or_default(),
                report.direction.unwrap_or_default().to_string(),
                report.command.clone().unwrap_or_default(),
                report.params.as_ref().map(preview).unwrap_or_default(),
                report.reason.clone().unwrap_or_default(),
            ]);
            println!("{table}");
        }
    }
}

pub fn print_replay(events: &[ReplayEvent], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for event in events {
                println!("{}", to_json_line(event));
            }
        }
        OutputFormat::Pretty => println!("{}", to_json_pretty(&events)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["STEP", "EVENT", "DETAIL"]);
            for event in events {
                table.add_row(vec![
                    event.step.to_string(),
                    event.event.to_string(),
                    preview(&event.detail),
                ]);
            }
            println!("{table}");
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json_line<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= PREVIEW_LIMIT {
        return text;
    }
    let mut clipped: String = text.chars().take(PREVIEW_LIMIT).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn preview_keeps_short_values() {
        assert_eq!(preview(&json!("hello")), "hello");
        assert_eq!(preview(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn preview_clips_long_values() {
        let long = "x".repeat(PREVIEW_LIMIT + 10);
        let clipped = preview(&json!(long));
        assert_eq!(clipped.chars().count(), PREVIEW_LIMIT + 1);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn decode_report_omits_empty_fields() {
        let report = DecodeReport {
            accepted: false,
            kind: None,
            direction: None,
            command: None,
            params: None,
            reason: Some("malformed message: expected object, got string".to_string()),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"accepted": false, "reason": "malformed message: expected object, got string"})
        );
    }
}
