//! Inbound commands from the server.
//!
//! Frames are JSON objects discriminated by `action`:
//!
//! ```text
//! {"action":"activate"}
//! {"action":"deactivate"}
//! {"action":"feed","food_type":"flakes","quantity":1}
//! ```
//!
//! Anything that is not a JSON object is a malformed message. An object
//! with a missing or unknown `action` is not an error; it is simply ignored.

use serde_json::Value;
use serde_json::error::Category;

use crate::error::{LinkError, MalformedKind};

/// Commands the [`DeviceSession`](super::session::DeviceSession) acts upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCommand {
    /// Server authorises telemetry and feeding.
    Activate,
    /// Server withdraws authorisation.
    Deactivate,
    /// Run the feeder once (only honoured while active).
    Feed(FeedRequest),
}

/// Optional details the server attaches to a feed command.
///
/// Informational only: every feed command is exactly one dispense. A
/// field of the wrong type is dropped rather than failing the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRequest {
    pub food_type: Option<String>,
    pub quantity: Option<u32>,
}

impl FeedRequest {
    fn from_frame(frame: &serde_json::Map<String, Value>) -> Self {
        Self {
            food_type: frame
                .get("food_type")
                .and_then(Value::as_str)
                .map(String::from),
            quantity: frame
                .get("quantity")
                .and_then(Value::as_u64)
                .and_then(|q| u32::try_from(q).ok()),
        }
    }
}

/// Parse one inbound text frame.
///
/// Only `action` decides what a frame is:
///
/// * `Ok(Some(cmd))` — a recognised command.
/// * `Ok(None)` — a JSON object whose `action` is missing, not a string,
///   or unknown.
/// * `Err(LinkError::Malformed(_))` — not JSON, or JSON that is not an object.
pub fn parse_command(raw: &str) -> Result<Option<InboundCommand>, LinkError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        LinkError::Malformed(match e.classify() {
            Category::Eof => MalformedKind::Eof,
            Category::Data => MalformedKind::Data,
            Category::Syntax | Category::Io => MalformedKind::Syntax,
        })
    })?;
    let Some(frame) = value.as_object() else {
        return Err(LinkError::Malformed(MalformedKind::Data));
    };

    let cmd = match frame.get("action").and_then(Value::as_str) {
        Some("activate") => InboundCommand::Activate,
        Some("deactivate") => InboundCommand::Deactivate,
        Some("feed") => InboundCommand::Feed(FeedRequest::from_frame(frame)),
        _ => return Ok(None),
    };
    Ok(Some(cmd))
}
