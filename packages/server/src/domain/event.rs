//! Events pushed to live connections after a committed mutation.
//!
//! Every variant owns a snapshot of the record it describes, so building the
//! payload and delivering it to N connections can never observe different
//! states of the store.

use serde::Serialize;

use super::{
    entity::{Chat, Message},
    value_object::{ChatId, MessageId, RoomId, UserId},
};

/// A typed event. Serializes as `{"type": <name>, "payload": <record>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    #[serde(rename = "new_message")]
    MessageCreated(Message),

    #[serde(rename = "message_updated")]
    MessageUpdated(Message),

    #[serde(rename = "message_deleted")]
    MessageDeleted {
        message_id: MessageId,
        chat_id: ChatId,
    },

    #[serde(rename = "chat_created")]
    ChatCreated(Chat),

    #[serde(rename = "chat_updated")]
    ChatUpdated(Chat),

    /// Sent to the removed user only
    #[serde(rename = "chat_removed")]
    ParticipantRemoved { chat_id: ChatId },

    #[serde(rename = "status")]
    Status { msg: String },
}

impl Event {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MessageCreated(_) => "new_message",
            Event::MessageUpdated(_) => "message_updated",
            Event::MessageDeleted { .. } => "message_deleted",
            Event::ChatCreated(_) => "chat_created",
            Event::ChatUpdated(_) => "chat_updated",
            Event::ParticipantRemoved { .. } => "chat_removed",
            Event::Status { .. } => "status",
        }
    }

    pub fn status(msg: impl Into<String>) -> Self {
        Event::Status { msg: msg.into() }
    }
}

/// Who an event is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every connection currently joined to the room
    Room(RoomId),
    /// Every connection registered for any of these users, joined or not
    Users(Vec<UserId>),
}

impl Target {
    pub fn room(chat_id: &ChatId) -> Self {
        Target::Room(RoomId::from(chat_id))
    }

    pub fn user(user_id: UserId) -> Self {
        Target::Users(vec![user_id])
    }
}
