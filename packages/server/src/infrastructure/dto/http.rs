//! HTTP API request and response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use crate::domain::{Chat, Message, User};

/// Body of `POST /api/users`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// Body of `PUT /api/users/me`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Body of `POST /api/chats`: either a direct chat with one user, or a named group
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateChatRequest {
    Direct {
        user_id: String,
    },
    Group {
        name: String,
        participants: Vec<String>,
    },
}

/// Body of `POST /api/chats/{chat_id}/participants`
#[derive(Debug, Clone, Deserialize)]
pub struct AddParticipantRequest {
    pub user_id: String,
}

/// Body of message create and edit requests
#[derive(Debug, Clone, Deserialize)]
pub struct MessageContentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// A chat with its most recent message and the other participants' profiles
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummaryDto {
    #[serde(flatten)]
    pub chat: Chat,
    pub last_message: Option<Message>,
    pub participant_details: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatSummaryDto>,
}

/// A chat with every participant's profile
#[derive(Debug, Clone, Serialize)]
pub struct ChatDetailDto {
    #[serde(flatten)]
    pub chat: Chat,
    pub participant_details: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

/// `{"msg": ...}` body used for plain acknowledgements and errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgResponse {
    pub msg: String,
}

impl MsgResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
