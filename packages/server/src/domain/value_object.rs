//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of any identifier
const MAX_ID_LEN: usize = 100;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, rejecting empty or overlong values.
            pub fn new(id: String) -> Result<Self, ValueObjectError> {
                if id.is_empty() {
                    return Err(ValueObjectError::IdEmpty { kind: $kind });
                }
                let len = id.chars().count();
                if len > MAX_ID_LEN {
                    return Err(ValueObjectError::IdTooLong {
                        kind: $kind,
                        max: MAX_ID_LEN,
                        actual: len,
                    });
                }
                Ok(Self(id))
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to owned String.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// User identifier value object.
    UserId,
    "UserId"
);

string_id!(
    /// Chat identifier value object. Every chat owns exactly one room.
    ChatId,
    "ChatId"
);

string_id!(
    /// Message identifier value object.
    MessageId,
    "MessageId"
);

string_id!(
    /// Live connection identifier value object.
    ConnectionId,
    "ConnectionId"
);

/// Room identifier value object.
///
/// Rooms map 1:1 onto chats, so a room is named by its chat's string identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(ChatId);

impl RoomId {
    /// Get the room name (the chat identifier).
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The chat this room broadcasts for.
    pub fn chat_id(&self) -> &ChatId {
        &self.0
    }
}

impl From<ChatId> for RoomId {
    fn from(chat_id: ChatId) -> Self {
        Self(chat_id)
    }
}

impl From<&ChatId> for RoomId {
    fn from(chat_id: &ChatId) -> Self {
        Self(chat_id.clone())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new Username (1 to 100 characters, surrounding whitespace trimmed).
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = name.chars().count();
        if len > 100 {
            return Err(ValueObjectError::UsernameTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group chat name value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChatName(String);

impl ChatName {
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValueObjectError::ChatNameEmpty);
        }
        let len = name.chars().count();
        if len > 100 {
            return Err(ValueObjectError::ChatNameTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChatName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChatName> for String {
    fn from(value: ChatName) -> Self {
        value.0
    }
}

/// Message content value object.
///
/// Represents the content of a chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new MessageContent.
    ///
    /// # Arguments
    ///
    /// * `content` - The message content string
    ///
    /// # Returns
    ///
    /// A Result containing the MessageContent or an error if validation fails
    pub fn new(content: String) -> Result<Self, ValueObjectError> {
        if content.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = content.chars().count();
        if len > 10000 {
            return Err(ValueObjectError::MessageContentTooLong {
                max: 10000,
                actual: len,
            });
        }
        Ok(Self(content))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(value: MessageContent) -> Self {
        value.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// A UTC instant, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    /// The current instant.
    pub fn now() -> Self {
        Self(roomcast_shared::time::now_utc())
    }

    /// Get the inner value.
    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", roomcast_shared::time::to_rfc3339(&self.0))
    }
}
