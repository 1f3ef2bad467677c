use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FrameError, Result};
use crate::kind::{PARENT_COMMAND, PARENT_READY};

/// Free-form display hints attached to `embed_data`.
pub type DisplayOptions = Map<String, Value>;

/// Current UTC time as ISO-8601 with millisecond precision (`2026-01-02T03:04:05.678Z`).
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Message sent from the embedded page to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    EmbedReady {
        #[serde(rename = "pageId")]
        page_id: String,
        timestamp: String,
    },
    EmbedData {
        #[serde(rename = "pageId")]
        page_id: String,
        data: Value,
        #[serde(default)]
        options: DisplayOptions,
        timestamp: String,
    },
    EmbedResize {
        #[serde(rename = "pageId")]
        page_id: String,
        height: u32,
    },
    EmbedClose {
        #[serde(rename = "pageId")]
        page_id: String,
    },
}

impl OutboundMessage {
    /// `embed_ready`, stamped now.
    pub fn ready(page_id: impl Into<String>) -> Self {
        Self::EmbedReady {
            page_id: page_id.into(),
            timestamp: timestamp_now(),
        }
    }

    /// `embed_data`, stamped now.
    pub fn data(page_id: impl Into<String>, data: Value, options: DisplayOptions) -> Self {
        Self::EmbedData {
            page_id: page_id.into(),
            data,
            options,
            timestamp: timestamp_now(),
        }
    }

    pub fn resize(page_id: impl Into<String>, height: u32) -> Self {
        Self::EmbedResize {
            page_id: page_id.into(),
            height,
        }
    }

    pub fn close(page_id: impl Into<String>) -> Self {
        Self::EmbedClose {
            page_id: page_id.into(),
        }
    }

    /// Wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmbedReady { .. } => crate::kind::EMBED_READY,
            Self::EmbedData { .. } => crate::kind::EMBED_DATA,
            Self::EmbedResize { .. } => crate::kind::EMBED_RESIZE,
            Self::EmbedClose { .. } => crate::kind::EMBED_CLOSE,
        }
    }

    pub fn page_id(&self) -> &str {
        match self {
            Self::EmbedReady { page_id, .. }
            | Self::EmbedData { page_id, .. }
            | Self::EmbedResize { page_id, .. }
            | Self::EmbedClose { page_id } => page_id,
        }
    }

    /// Encode to the JSON value handed to the host runtime.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a message previously produced by [`OutboundMessage::to_value`].
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

/// Severity/intent of a text message shown by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Info,
    Success,
    Error,
    Data,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "data" => Ok(Self::Data),
            other => Err(FrameError::Malformed(format!(
                "unknown message kind '{other}' (expected info, success, error or data)"
            ))),
        }
    }
}

/// Text message payload, carried as the `data` of an `embed_data` message.
///
/// Serializes as `{"type": "message", "messageType": <kind>, "content": <text>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "message")]
pub struct TextMessage {
    #[serde(rename = "messageType")]
    pub kind: MessageKind,
    pub content: String,
}

impl TextMessage {
    pub fn new(content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Message received from the host, after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Host finished loading and is listening.
    ParentReady,
    /// Named command with opaque parameters (`null` when absent).
    ParentCommand { command: String, params: Value },
}

impl InboundMessage {
    /// Validate an untrusted value from the host.
    ///
    /// Anything that is not an object with a known string `type` is rejected;
    /// a `parent_command` additionally needs a string `command`.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            FrameError::Malformed(format!("expected object, got {}", json_kind(value)))
        })?;

        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| FrameError::Malformed("missing string field 'type'".to_string()))?;

        match tag {
            PARENT_READY => Ok(Self::ParentReady),
            PARENT_COMMAND => {
                let command = object
                    .get("command")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        FrameError::Malformed(
                            "parent_command without string field 'command'".to_string(),
                        )
                    })?;
                let params = object.get("params").cloned().unwrap_or(Value::Null);
                Ok(Self::ParentCommand {
                    command: command.to_string(),
                    params,
                })
            }
            other => Err(FrameError::UnknownType(other.to_string())),
        }
    }

    /// Wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParentReady => PARENT_READY,
            Self::ParentCommand { .. } => PARENT_COMMAND,
        }
    }

    /// Encode as the host would send it.
    pub fn to_value(&self) -> Value {
        match self {
            Self::ParentReady => serde_json::json!({ "type": PARENT_READY }),
            Self::ParentCommand { command, params } => serde_json::json!({
                "type": PARENT_COMMAND,
                "command": command,
                "params": params,
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
