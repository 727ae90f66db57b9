//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Identifier validation error
    #[error("{kind} cannot be empty")]
    IdEmpty { kind: &'static str },

    /// Identifier too long error
    #[error("{kind} cannot exceed {max} characters (got {actual})")]
    IdTooLong {
        kind: &'static str,
        max: usize,
        actual: usize,
    },

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// ChatName validation error
    #[error("Chat name cannot be empty")]
    ChatNameEmpty,

    /// ChatName too long error
    #[error("Chat name cannot exceed {max} characters (got {actual})")]
    ChatNameTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors related to Chat domain rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat {0} is not a group chat")]
    NotGroup(String),

    #[error("User {user_id} is already in chat {chat_id}")]
    AlreadyParticipant { chat_id: String, user_id: String },

    #[error("User {user_id} is not in chat {chat_id}")]
    NotParticipant { chat_id: String, user_id: String },

    #[error("Owner cannot be removed from chat {0}")]
    OwnerCannotBeRemoved(String),

    #[error("A direct chat needs two different users")]
    DirectChatWithSelf,
}

/// Errors returned by the durable store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// A chat rule rejected the change inside the store
    #[error(transparent)]
    Rule(#[from] ChatError),
}

/// Errors related to the per-connection session lifecycle
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The requesting identity is not a participant of the chat behind the room
    #[error("Permission denied: user {user_id} is not a participant of chat {chat_id}")]
    PermissionDenied { user_id: String, chat_id: String },

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Connection {0} is disconnected")]
    Disconnected(String),

    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Registry and directory disagree about a membership. Always a bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Room {room_id} lists connection {connection_id}, but the connection has not joined it")]
    MissingJoinedRoom {
        room_id: String,
        connection_id: String,
    },

    #[error("Connection {connection_id} has joined room {room_id}, but the room does not list it")]
    MissingRoomMember {
        room_id: String,
        connection_id: String,
    },
}
