//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{
    add_participant, create_chat, create_user, delete_message, edit_message, get_chat, get_me,
    health_check, list_chats, list_messages, list_users, remove_participant, send_message,
    update_me,
};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
