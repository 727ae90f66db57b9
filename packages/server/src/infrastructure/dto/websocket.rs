//! WebSocket message DTOs for the chat application.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{Event, RoomId};

/// Requests a client may send over its WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    Join { chat_id: String },
    Leave { chat_id: String },
}

/// Encode an event as one outbound frame.
///
/// The frame is `{"channel": <room>, "type": <event>, "payload": <record>}`;
/// `channel` is omitted for events addressed to users rather than a room.
pub fn encode_event_frame(
    event: &Event,
    channel: Option<&RoomId>,
) -> Result<Arc<str>, serde_json::Error> {
    let mut value = serde_json::to_value(event)?;
    if let (Some(room_id), Some(object)) = (channel, value.as_object_mut()) {
        object.insert(
            "channel".to_string(),
            serde_json::Value::String(room_id.as_str().to_string()),
        );
    }
    Ok(Arc::from(serde_json::to_string(&value)?))
}
